#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Search for the weakest elf attack power that wins a battle without losses.
//!
//! Every candidate power is simulated on an independent clone of the starting
//! battle. Candidates run in parallel, and the reported power is always the
//! lowest lossless one, exactly as a sequential scan would find it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::{Outcome, Team};
use skirmish_system_battle::Battle;
use thiserror::Error;

/// Lowest attack power tried by default; weaker elves cannot outpace goblins.
pub const DEFAULT_MIN_ATTACK_POWER: u32 = 4;

/// Highest attack power tried by default; it kills any unit in a single hit.
pub const DEFAULT_MAX_ATTACK_POWER: u32 = 200;

/// Errors raised by a misconfigured search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    /// The search range is empty or starts at zero.
    #[error("attack power range {min}..={max} is invalid")]
    InvalidRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
}

/// Attack power range to search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// First attack power tried.
    pub min_attack_power: u32,
    /// Last attack power tried.
    pub max_attack_power: u32,
    /// Rounds each candidate battle may last; unlimited when `None`.
    #[serde(skip)]
    pub round_limit: Option<u32>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_attack_power: DEFAULT_MIN_ATTACK_POWER,
            max_attack_power: DEFAULT_MAX_ATTACK_POWER,
            round_limit: None,
        }
    }
}

/// Lowest lossless attack power together with the battle it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CalibrationResult {
    /// Attack power assigned to every elf.
    pub attack_power: u32,
    /// Outcome of the battle fought with that power.
    pub outcome: Outcome,
}

impl Calibration {
    /// Finds the lowest elf attack power that wins `battle` without a single
    /// elf dying.
    ///
    /// `battle` is never modified; each candidate runs on its own clone.
    /// Returns `Ok(None)` when no power in range is enough.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::InvalidRange`] when the range is empty or
    /// starts at zero.
    pub fn search(&self, battle: &Battle) -> Result<Option<CalibrationResult>, CalibrationError> {
        let Self {
            min_attack_power: min,
            max_attack_power: max,
            round_limit,
        } = *self;
        if min == 0 || min > max {
            return Err(CalibrationError::InvalidRange { min, max });
        }

        let elves = battle.live_unit_count(Team::Elf);
        let found = (min..=max)
            .into_par_iter()
            .find_map_first(|power| evaluate(battle, power, elves, round_limit));

        match &found {
            Some(result) => tracing::info!(
                attack_power = result.attack_power,
                value = ?result.outcome.value(),
                "lossless attack power found"
            ),
            None => tracing::info!(min, max, "no lossless attack power in range"),
        }
        Ok(found)
    }
}

fn evaluate(
    template: &Battle,
    attack_power: u32,
    elves: usize,
    round_limit: Option<u32>,
) -> Option<CalibrationResult> {
    let mut battle = template.clone();
    battle.set_attack_power(Team::Elf, attack_power);

    let outcome = match round_limit {
        Some(limit) => battle.find_outcome_within(limit)?,
        None => battle.find_outcome(),
    };
    tracing::debug!(attack_power, ?outcome, "candidate evaluated");

    let lossless =
        outcome.winner() == Some(Team::Elf) && battle.live_unit_count(Team::Elf) == elves;
    lossless.then_some(CalibrationResult {
        attack_power,
        outcome,
    })
}
