#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for Skirmish.
//!
//! The world owns the grid, the unit arena and the per-team aggregates. It is
//! mutated exclusively through [`apply`], which executes a single [`Command`]
//! atomically and reports what happened as [`Event`] values. A command whose
//! preconditions do not hold reveals a defect in the caller, so `apply` panics
//! instead of attempting a repair.

pub mod invariants;

use skirmish_core::{
    BattleConfig, Cell, CellCoord, Command, Event, Layout, Team, Tile, Unit, UnitId,
};

/// Represents the authoritative Skirmish battlefield.
#[derive(Clone, Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
    units: Vec<Option<Unit>>,
    teams: [TeamTally; 2],
    starting_hit_points: u32,
}

impl World {
    /// Creates an empty world of open floor with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32, config: &BattleConfig) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::Open; capacity],
            units: Vec::new(),
            teams: [
                TeamTally::new(config.attack_power(Team::Elf)),
                TeamTally::new(config.attack_power(Team::Goblin)),
            ],
            starting_hit_points: config.starting_hit_points,
        }
    }

    /// Builds the starting battlefield described by a parsed layout.
    ///
    /// Units are placed in the order the layout lists them, so identifiers
    /// follow that order.
    #[must_use]
    pub fn from_layout(layout: &Layout, config: &BattleConfig) -> Self {
        let mut world = Self::new(layout.columns(), layout.rows(), config);
        for (slot, tile) in world.cells.iter_mut().zip(layout.tiles()) {
            *slot = match tile {
                Tile::Open => Cell::Open,
                Tile::Wall => Cell::Wall,
            };
        }

        let mut events = Vec::new();
        for placement in layout.placements() {
            apply(
                &mut world,
                Command::PlaceUnit {
                    team: placement.team,
                    cell: placement.cell,
                },
                &mut events,
            );
        }
        world
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn live_unit(&self, unit: UnitId) -> Unit {
        match self.units.get(unit.index()).copied().flatten() {
            Some(live) => live,
            None => panic!("unit {} is not alive", unit.get()),
        }
    }

    fn tally_mut(&mut self, team: Team) -> &mut TeamTally {
        &mut self.teams[team.index()]
    }

    fn place(&mut self, team: Team, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.index(cell) else {
            panic!("cannot place a unit outside the grid at {cell:?}");
        };
        if self.cells[index] != Cell::Open {
            panic!("cannot place a unit on {cell:?}: cell is {:?}", self.cells[index]);
        }
        let Ok(raw_id) = u32::try_from(self.units.len()) else {
            panic!("unit identifiers exhausted");
        };

        let id = UnitId::new(raw_id);
        let hit_points = self.starting_hit_points;
        self.units.push(Some(Unit {
            id,
            team,
            cell,
            hit_points,
        }));
        self.cells[index] = Cell::Occupied(id);

        let tally = self.tally_mut(team);
        tally.hit_points += hit_points;
        tally.count += 1;

        out_events.push(Event::UnitPlaced {
            unit: id,
            team,
            cell,
        });
    }

    fn move_unit(&mut self, unit: UnitId, to: CellCoord, out_events: &mut Vec<Event>) {
        let current = self.live_unit(unit);
        let from = current.cell;
        let Some(to_index) = self.index(to) else {
            panic!("unit {} cannot move outside the grid to {to:?}", unit.get());
        };
        if self.cells[to_index] != Cell::Open {
            panic!(
                "unit {} cannot move onto {to:?}: cell is {:?}",
                unit.get(),
                self.cells[to_index]
            );
        }
        let Some(from_index) = self.index(from) else {
            panic!("unit {} stands outside the grid at {from:?}", unit.get());
        };

        self.cells[from_index] = Cell::Open;
        self.cells[to_index] = Cell::Occupied(unit);
        if let Some(Some(moving)) = self.units.get_mut(unit.index()) {
            moving.cell = to;
        }

        out_events.push(Event::UnitMoved { unit, from, to });
    }

    fn attack(&mut self, attacker: UnitId, target: UnitId, out_events: &mut Vec<Event>) {
        let striker = self.live_unit(attacker);
        let victim = self.live_unit(target);
        if striker.team == victim.team {
            panic!(
                "unit {} attacked unit {} of its own team",
                attacker.get(),
                target.get()
            );
        }
        if !striker.cell.is_adjacent(victim.cell) {
            panic!(
                "unit {} at {:?} attacked non-adjacent unit {} at {:?}",
                attacker.get(),
                striker.cell,
                target.get(),
                victim.cell
            );
        }

        let power = self.teams[striker.team.index()].attack_power;
        if victim.hit_points <= power {
            out_events.push(Event::UnitAttacked {
                attacker,
                target,
                damage: victim.hit_points,
                remaining: 0,
            });
            self.remove(victim.cell, out_events);
            return;
        }

        let remaining = victim.hit_points - power;
        if let Some(Some(hit)) = self.units.get_mut(target.index()) {
            hit.hit_points = remaining;
        }
        self.tally_mut(victim.team).hit_points -= power;

        out_events.push(Event::UnitAttacked {
            attacker,
            target,
            damage: power,
            remaining,
        });
    }

    fn remove(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.index(cell) else {
            panic!("cannot remove a unit outside the grid at {cell:?}");
        };
        let Cell::Occupied(unit) = self.cells[index] else {
            panic!("cannot remove a unit from {cell:?}: cell is {:?}", self.cells[index]);
        };
        let removed = self.live_unit(unit);

        self.cells[index] = Cell::Open;
        self.units[unit.index()] = None;
        let tally = self.tally_mut(removed.team);
        tally.hit_points -= removed.hit_points;
        tally.count -= 1;

        tracing::trace!(
            unit = unit.get(),
            team = ?removed.team,
            row = cell.row(),
            column = cell.column(),
            "unit removed"
        );
        out_events.push(Event::UnitRemoved {
            unit,
            team: removed.team,
            cell,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// # Panics
///
/// Panics when the command's preconditions do not hold: placing onto or moving
/// into a cell that is not open floor, addressing a dead unit, attacking an
/// ally or a unit that is not adjacent, removing from an empty cell, or setting
/// a zero attack power.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceUnit { team, cell } => world.place(team, cell, out_events),
        Command::MoveUnit { unit, to } => world.move_unit(unit, to, out_events),
        Command::Attack { attacker, target } => world.attack(attacker, target, out_events),
        Command::RemoveUnit { cell } => world.remove(cell, out_events),
        Command::SetAttackPower { team, power } => {
            assert!(power > 0, "attack power of {team:?} must be positive");
            world.tally_mut(team).attack_power = power;
            out_events.push(Event::AttackPowerChanged { team, power });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use skirmish_core::{CellCoord, GridView, Team, TeamSnapshot, Tile, Unit, UnitId};

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// Terrain of the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<Tile> {
        world
            .index(cell)
            .and_then(|index| world.cells.get(index))
            .map(|contents| contents.tile())
    }

    /// Live unit standing on the provided cell.
    #[must_use]
    pub fn unit_at(world: &World, cell: CellCoord) -> Option<&Unit> {
        grid_view(world).occupant(cell)
    }

    /// Live unit with the provided identifier.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<&Unit> {
        world.units.get(unit.index()).and_then(Option::as_ref)
    }

    /// Live units in reading order of their current cells.
    pub fn units(world: &World) -> impl Iterator<Item = &Unit> + '_ {
        world
            .cells
            .iter()
            .filter_map(|cell| cell.occupant())
            .filter_map(move |id| unit(world, id))
    }

    /// Number of identifiers handed out so far, dead units included.
    #[must_use]
    pub fn unit_capacity(world: &World) -> usize {
        world.units.len()
    }

    /// Aggregate hit points, head count and attack power of a team.
    #[must_use]
    pub fn team(world: &World, team: Team) -> TeamSnapshot {
        let tally = world.teams[team.index()];
        TeamSnapshot {
            team,
            hit_points: tally.hit_points,
            count: tally.count,
            attack_power: tally.attack_power,
        }
    }

    /// Hit points assigned to units when they are placed.
    #[must_use]
    pub fn starting_hit_points(world: &World) -> u32 {
        world.starting_hit_points
    }

    /// Captures a read-only view of the grid for systems.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView::new(&world.cells, &world.units, world.columns, world.rows)
    }
}

#[derive(Clone, Copy, Debug)]
struct TeamTally {
    hit_points: u32,
    count: usize,
    attack_power: u32,
}

impl TeamTally {
    const fn new(attack_power: u32) -> Self {
        Self {
            hit_points: 0,
            count: 0,
            attack_power,
        }
    }
}
