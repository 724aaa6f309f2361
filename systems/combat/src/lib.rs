#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits attack commands for units standing next to enemies.

use skirmish_core::{Command, GridView, Unit};

/// Combat system that selects the weakest adjacent enemy for each attacker.
#[derive(Clone, Copy, Debug, Default)]
pub struct Combat;

impl Combat {
    /// Creates a new combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::Attack` when `attacker` stands next to an enemy.
    pub fn handle(&self, view: GridView<'_>, attacker: &Unit, out: &mut Vec<Command>) {
        if let Some(target) = self.select_target(view, attacker) {
            out.push(Command::Attack {
                attacker: attacker.id,
                target: target.id,
            });
        }
    }

    /// Adjacent enemy with the fewest hit points, ties broken in reading order.
    #[must_use]
    pub fn select_target<'a>(&self, view: GridView<'a>, attacker: &Unit) -> Option<&'a Unit> {
        let enemy_team = attacker.team.enemy();
        view.neighbors(attacker.cell)
            .filter_map(|cell| view.occupant(cell))
            .filter(|unit| unit.team == enemy_team)
            .min_by_key(|unit| (unit.hit_points, unit.cell))
    }
}
