//! World invariants - consistency checks that detect engine bugs.
//!
//! `apply` keeps the grid, the unit arena and the team aggregates in lockstep.
//! None of these checks should ever report a violation; if one does, a
//! mutation was applied halfway or bookkeeping drifted.

use std::fmt;

use skirmish_core::{Cell, CellCoord, Team};

use crate::World;

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns every violation found, or an empty list when the world is
/// consistent.
#[must_use]
pub fn check(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    check_cells(world, &mut violations);
    check_units(world, &mut violations);
    for team in Team::ALL {
        check_team(world, team, &mut violations);
    }
    violations
}

fn check_cells(world: &World, violations: &mut Vec<InvariantViolation>) {
    for (offset, cell) in world.cells.iter().enumerate() {
        let Cell::Occupied(id) = *cell else {
            continue;
        };
        let coord = coord_of(world, offset);
        match world.units.get(id.index()).copied().flatten() {
            None => violations.push(InvariantViolation {
                message: format!("cell {coord:?} is occupied by dead unit {}", id.get()),
            }),
            Some(unit) if unit.cell != coord => violations.push(InvariantViolation {
                message: format!(
                    "cell {coord:?} holds unit {} which believes it stands on {:?}",
                    id.get(),
                    unit.cell
                ),
            }),
            Some(_) => {}
        }
    }
}

fn check_units(world: &World, violations: &mut Vec<InvariantViolation>) {
    for unit in world.units.iter().flatten() {
        if unit.hit_points == 0 {
            violations.push(InvariantViolation {
                message: format!("unit {} is alive with zero hit points", unit.id.get()),
            });
        }

        let occupant = world
            .index(unit.cell)
            .and_then(|index| world.cells.get(index))
            .and_then(|cell| cell.occupant());
        if occupant != Some(unit.id) {
            violations.push(InvariantViolation {
                message: format!(
                    "unit {} stands on {:?} but the cell holds {occupant:?}",
                    unit.id.get(),
                    unit.cell
                ),
            });
        }
    }
}

fn check_team(world: &World, team: Team, violations: &mut Vec<InvariantViolation>) {
    let (hit_points, count) = world
        .units
        .iter()
        .flatten()
        .filter(|unit| unit.team == team)
        .fold((0_u32, 0_usize), |(hit_points, count), unit| {
            (hit_points + unit.hit_points, count + 1)
        });

    let tally = world.teams[team.index()];
    if tally.hit_points != hit_points {
        violations.push(InvariantViolation {
            message: format!(
                "{team:?} aggregate hit points {} differ from unit sum {hit_points}",
                tally.hit_points
            ),
        });
    }
    if tally.count != count {
        violations.push(InvariantViolation {
            message: format!(
                "{team:?} aggregate count {} differs from live units {count}",
                tally.count
            ),
        });
    }
}

fn coord_of(world: &World, offset: usize) -> CellCoord {
    let width = usize::try_from(world.columns).unwrap_or(1).max(1);
    let column = u32::try_from(offset % width).unwrap_or(u32::MAX);
    let row = u32::try_from(offset / width).unwrap_or(u32::MAX);
    CellCoord::new(column, row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{BattleConfig, Command, UnitId};

    #[test]
    fn fresh_world_is_consistent() {
        let mut world = World::new(3, 3, &BattleConfig::default());
        let mut events = Vec::new();
        crate::apply(
            &mut world,
            Command::PlaceUnit {
                team: Team::Elf,
                cell: CellCoord::new(1, 1),
            },
            &mut events,
        );

        assert!(check(&world).is_empty());
    }

    #[test]
    fn drifted_aggregate_is_reported() {
        let mut world = World::new(3, 3, &BattleConfig::default());
        let mut events = Vec::new();
        crate::apply(
            &mut world,
            Command::PlaceUnit {
                team: Team::Goblin,
                cell: CellCoord::new(0, 2),
            },
            &mut events,
        );
        world.teams[Team::Goblin.index()].hit_points += 1;

        let violations = check(&world);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Goblin aggregate hit points"));
    }

    #[test]
    fn stale_occupancy_is_reported() {
        let mut world = World::new(2, 1, &BattleConfig::default());
        world.cells[1] = Cell::Occupied(UnitId::new(0));

        let violations = check(&world);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("dead unit 0"));
    }
}
