#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round engine and battle driver.
//!
//! A [`Battle`] owns the world together with the movement and combat systems.
//! Each call to [`Battle::simulate`] runs one round: the grid is scanned in
//! reading order and every live unit that has not acted yet takes a turn,
//! first moving toward the nearest enemy and then attacking the weakest
//! adjacent one. Systems only propose commands; the world applies them.

use skirmish_core::{
    BattleConfig, CellCoord, ClearPolicy, Command, Event, Layout, Outcome, RoundReport, Team, Unit,
};
use skirmish_system_combat::Combat;
use skirmish_system_pathfinding::{DistanceMap, Movement};
use skirmish_world::{self as world, invariants, query, World};

/// Deterministic battle between elves and goblins.
///
/// Cloning a battle yields an independent copy that replays identically,
/// which is how calibration evaluates candidate attack powers side by side.
#[derive(Clone, Debug)]
pub struct Battle {
    world: World,
    movement: Movement,
    combat: Combat,
    acted: Vec<bool>,
    rounds: u32,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Battle {
    /// Creates a battle over an existing world.
    #[must_use]
    pub fn new(world: World, policy: ClearPolicy) -> Self {
        let (columns, rows) = query::dimensions(&world);
        Self {
            world,
            movement: Movement::new(columns, rows, policy),
            combat: Combat::new(),
            acted: Vec::new(),
            rounds: 0,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Builds the starting battle described by a parsed layout.
    #[must_use]
    pub fn from_layout(layout: &Layout, config: &BattleConfig) -> Self {
        Self::new(World::from_layout(layout, config), config.clear_policy)
    }

    /// Simulates one round and reports whether it made progress.
    ///
    /// # Panics
    ///
    /// Panics when a system proposes a command whose preconditions do not
    /// hold. Debug builds additionally panic when the world invariants break.
    pub fn simulate(&mut self) -> RoundReport {
        let Self {
            world,
            movement,
            combat,
            acted,
            rounds,
            commands,
            events,
        } = self;

        events.clear();
        acted.clear();
        acted.resize(query::unit_capacity(world), false);

        let mut report = RoundReport {
            advanced: false,
            full_round: true,
        };
        let (columns, rows) = query::dimensions(world);
        for row in 0..rows {
            for column in 0..columns {
                let Some(unit) = query::unit_at(world, CellCoord::new(column, row)).copied() else {
                    continue;
                };
                if std::mem::replace(&mut acted[unit.id.index()], true) {
                    continue;
                }

                if Team::ALL
                    .into_iter()
                    .any(|team| query::team(world, team).count == 0)
                {
                    report.full_round = false;
                }
                if take_turn(world, movement, *combat, unit, commands, events) {
                    report.advanced = true;
                }
            }
        }

        *rounds += 1;
        tracing::debug!(
            round = *rounds,
            advanced = report.advanced,
            full_round = report.full_round,
            elves = query::team(world, Team::Elf).count,
            goblins = query::team(world, Team::Goblin).count,
            "round simulated"
        );
        debug_assert!(
            invariants::check(world).is_empty(),
            "world invariants broken after round {}: {:?}",
            *rounds,
            invariants::check(world)
        );

        report
    }

    /// Simulates rounds until the battle ends.
    ///
    /// A round in which no unit moves or attacks ends the battle as
    /// [`Outcome::Unresolved`]; nothing would ever change afterwards.
    pub fn find_outcome(&mut self) -> Outcome {
        loop {
            if let Some(outcome) = self.play_round() {
                return outcome;
            }
        }
    }

    /// Simulates at most `limit` rounds looking for the end of the battle.
    ///
    /// Returns `None` when the battle is still running after `limit` rounds.
    pub fn find_outcome_within(&mut self, limit: u32) -> Option<Outcome> {
        (0..limit).find_map(|_| self.play_round())
    }

    /// Simulates one round and returns the outcome if the battle ended with it.
    pub fn play_round(&mut self) -> Option<Outcome> {
        let report = self.simulate();
        if !report.advanced {
            return Some(Outcome::Unresolved {
                rounds: self.rounds,
            });
        }

        let remaining_hit_points = self.outcome_reached()?;
        let completed_rounds = self.rounds - 1 + u32::from(report.full_round);
        let outcome = Outcome::Resolved {
            winner: self.winner(),
            completed_rounds,
            remaining_hit_points,
        };
        tracing::debug!(?outcome, "battle resolved");
        Some(outcome)
    }

    /// Total hit points left once at most one team remains on the field.
    ///
    /// Returns `None` while both teams still have live units.
    #[must_use]
    pub fn outcome_reached(&self) -> Option<u32> {
        let elves = query::team(&self.world, Team::Elf);
        let goblins = query::team(&self.world, Team::Goblin);
        if elves.count > 0 && goblins.count > 0 {
            return None;
        }
        Some(elves.hit_points + goblins.hit_points)
    }

    /// Overrides the attack power of every unit on `team`.
    ///
    /// # Panics
    ///
    /// Panics when `power` is zero.
    pub fn set_attack_power(&mut self, team: Team, power: u32) {
        world::apply(
            &mut self.world,
            Command::SetAttackPower { team, power },
            &mut self.events,
        );
    }

    /// Number of live units fighting for `team`.
    #[must_use]
    pub fn live_unit_count(&self, team: Team) -> usize {
        query::team(&self.world, team).count
    }

    /// Team left standing once the other one has been wiped out.
    #[must_use]
    pub fn winner(&self) -> Option<Team> {
        let mut standing = Team::ALL
            .into_iter()
            .filter(|team| self.live_unit_count(*team) > 0);
        match (standing.next(), standing.next()) {
            (Some(team), None) => Some(team),
            _ => None,
        }
    }

    /// Battlefield in its current state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of rounds simulated so far.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Events produced by the latest round.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Distance map left behind by the latest flood.
    #[must_use]
    pub fn distances(&self) -> &DistanceMap {
        self.movement.distances()
    }
}

/// Plays one unit's turn and reports whether it moved or attacked.
fn take_turn(
    world: &mut World,
    movement: &mut Movement,
    combat: Combat,
    unit: Unit,
    commands: &mut Vec<Command>,
    events: &mut Vec<Event>,
) -> bool {
    commands.clear();
    movement.handle(query::grid_view(world), &unit, commands);
    let moved = dispatch(world, commands, events);

    let Some(current) = query::unit(world, unit.id).copied() else {
        return moved;
    };
    combat.handle(query::grid_view(world), &current, commands);
    let attacked = dispatch(world, commands, events);

    moved || attacked
}

fn dispatch(world: &mut World, commands: &mut Vec<Command>, events: &mut Vec<Event>) -> bool {
    let issued = !commands.is_empty();
    for command in commands.drain(..) {
        world::apply(world, command, events);
    }
    issued
}
