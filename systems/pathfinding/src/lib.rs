#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that picks goals and proposes unit steps.
//!
//! Every turn runs two floods over a shared [`DistanceMap`]: one outward from
//! the acting unit to find the nearest enemies, and one outward from the chosen
//! goal to find which first step lies on a shortest path. Ties are always
//! broken in reading order, never in discovery order.

mod distance;

pub use distance::{DistanceMap, FloodStep, Reach};

use skirmish_core::{Cell, CellCoord, ClearPolicy, Command, GridView, Team, Unit, UnitId};

/// Open cell a unit walks toward during its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Goal {
    cell: CellCoord,
    distance: u32,
}

impl Goal {
    /// Cell the unit wants to reach.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Number of steps between the unit and the goal.
    ///
    /// Zero means the unit already stands next to an enemy.
    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }
}

/// Pure system that emits at most one movement command per unit turn.
#[derive(Clone, Debug)]
pub struct Movement {
    distances: DistanceMap,
    enemies: Vec<CellCoord>,
}

impl Movement {
    /// Creates a movement system for a `columns` x `rows` battlefield.
    #[must_use]
    pub fn new(columns: u32, rows: u32, policy: ClearPolicy) -> Self {
        Self {
            distances: DistanceMap::new(columns, rows, policy),
            enemies: Vec::new(),
        }
    }

    /// Emits `Command::MoveUnit` when `unit` should step toward an enemy.
    ///
    /// Nothing is emitted when no enemy is reachable or when the unit already
    /// stands next to one.
    ///
    /// # Panics
    ///
    /// Panics when a reachable goal has no shortest path back to the unit,
    /// which would mean the distance map is corrupt.
    pub fn handle(&mut self, view: GridView<'_>, unit: &Unit, out: &mut Vec<Command>) {
        let Some(goal) = self.select_goal(view, unit) else {
            return;
        };
        if goal.cell() == unit.cell {
            return;
        }

        let Some(next) = self.select_step(view, unit.cell, goal.cell()) else {
            panic!(
                "no step leads from {:?} toward reachable goal {:?}",
                unit.cell,
                goal.cell()
            );
        };
        out.push(Command::MoveUnit {
            unit: unit.id,
            to: next,
        });
    }

    /// Picks the open cell `unit` should walk toward.
    ///
    /// Floods outward until the nearest enemies are found and returns the
    /// reading-order-first open cell next to any of them that lies one step
    /// closer than the enemies themselves. When an enemy is already adjacent
    /// the unit's own cell is returned with distance zero. Returns `None` when
    /// no enemy can be reached.
    pub fn select_goal(&mut self, view: GridView<'_>, unit: &Unit) -> Option<Goal> {
        let Self { distances, enemies } = self;
        let enemy_team = unit.team.enemy();

        enemies.clear();
        let enemy_distance = distances.flood(unit.cell, |cell| match view.cell(cell) {
            Some(Cell::Open) => FloodStep::Continue,
            Some(Cell::Occupied(id)) if is_team(view, id, enemy_team) => {
                enemies.push(cell);
                FloodStep::Stop
            }
            _ => FloodStep::Blocked,
        })?;

        let goal_distance = enemy_distance - 1;
        if goal_distance == 0 {
            return Some(Goal {
                cell: unit.cell,
                distance: 0,
            });
        }

        let mut best: Option<CellCoord> = None;
        for &enemy in enemies.iter() {
            for neighbor in view.neighbors(enemy) {
                if distances.distance(neighbor) != Some(goal_distance) {
                    continue;
                }
                if best.map_or(true, |current| neighbor < current) {
                    best = Some(neighbor);
                }
            }
        }

        best.map(|cell| Goal {
            cell,
            distance: goal_distance,
        })
    }

    /// Picks the first step from `from` along a shortest path to `goal`.
    ///
    /// Floods outward from the goal through open cells until `from` is
    /// reached, then returns the reading-order-first neighbour of `from` that
    /// is one step closer to the goal. Returns `from` itself when it already
    /// is the goal and `None` when the goal cannot be reached.
    pub fn select_step(
        &mut self,
        view: GridView<'_>,
        from: CellCoord,
        goal: CellCoord,
    ) -> Option<CellCoord> {
        if from == goal {
            return Some(from);
        }

        let total = self.distances.flood(goal, |cell| {
            if cell == from {
                FloodStep::Stop
            } else if view.is_open(cell) {
                FloodStep::Continue
            } else {
                FloodStep::Blocked
            }
        })?;

        let wanted = total.checked_sub(1)?;
        view.neighbors(from)
            .find(|neighbor| self.distances.distance(*neighbor) == Some(wanted))
    }

    /// Distance map left behind by the most recent flood.
    #[must_use]
    pub fn distances(&self) -> &DistanceMap {
        &self.distances
    }
}

fn is_team(view: GridView<'_>, id: UnitId, team: Team) -> bool {
    view.unit(id).is_some_and(|unit| unit.team == team)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_enemy_keeps_unit_in_place() {
        let elf = Unit {
            id: UnitId::new(0),
            team: Team::Elf,
            cell: CellCoord::new(1, 0),
            hit_points: 200,
        };
        let goblin = Unit {
            id: UnitId::new(1),
            team: Team::Goblin,
            cell: CellCoord::new(2, 0),
            hit_points: 200,
        };
        let cells = [
            Cell::Open,
            Cell::Occupied(elf.id),
            Cell::Occupied(goblin.id),
            Cell::Open,
        ];
        let units = [Some(elf), Some(goblin)];
        let view = GridView::new(&cells, &units, 4, 1);
        let mut movement = Movement::new(4, 1, ClearPolicy::BoundingBox);

        let goal = movement.select_goal(view, &elf).expect("enemy reachable");
        assert_eq!(goal.cell(), elf.cell);
        assert_eq!(goal.distance(), 0);

        let mut out = Vec::new();
        movement.handle(view, &elf, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn allies_block_the_way() {
        let elf = Unit {
            id: UnitId::new(0),
            team: Team::Elf,
            cell: CellCoord::new(0, 0),
            hit_points: 200,
        };
        let ally = Unit {
            id: UnitId::new(1),
            team: Team::Elf,
            cell: CellCoord::new(1, 0),
            hit_points: 200,
        };
        let goblin = Unit {
            id: UnitId::new(2),
            team: Team::Goblin,
            cell: CellCoord::new(3, 0),
            hit_points: 200,
        };
        let cells = [
            Cell::Occupied(elf.id),
            Cell::Occupied(ally.id),
            Cell::Open,
            Cell::Occupied(goblin.id),
        ];
        let units = [Some(elf), Some(ally), Some(goblin)];
        let view = GridView::new(&cells, &units, 4, 1);
        let mut movement = Movement::new(4, 1, ClearPolicy::Full);

        assert_eq!(movement.select_goal(view, &elf), None);
        assert_eq!(
            movement.select_goal(view, &ally).map(|goal| goal.cell()),
            Some(CellCoord::new(2, 0))
        );
    }
}
