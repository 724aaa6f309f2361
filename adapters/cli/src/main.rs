#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Skirmish battles from layout files.

mod settings;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use skirmish_core::{BattleConfig, ClearPolicy, Outcome, Team};
use skirmish_rendering::GridDump;
use skirmish_system_battle::Battle;
use skirmish_system_calibration::Calibration;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Deterministic elves-versus-goblins battle simulator.
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about)]
struct Cli {
    /// TOML settings file; command-line flags take precedence over it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fight the battle and print its outcome.
    Outcome {
        #[command(flatten)]
        battle: BattleArgs,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the battlefield after every round.
    Replay {
        #[command(flatten)]
        battle: BattleArgs,
    },
    /// Find the weakest elf attack power that wins without losing an elf.
    Calibrate {
        #[command(flatten)]
        common: CommonArgs,

        /// First attack power tried.
        #[arg(long)]
        min_attack_power: Option<u32>,

        /// Last attack power tried.
        #[arg(long)]
        max_attack_power: Option<u32>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Layout file made of `.`, `#`, `E` and `G`.
    layout: PathBuf,

    /// Distance map reset strategy.
    #[arg(long, value_enum)]
    clear_policy: Option<PolicyArg>,

    /// Give up when the battle lasts longer than this many rounds.
    #[arg(long)]
    round_limit: Option<u32>,
}

#[derive(Args, Debug)]
struct BattleArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Attack power of every elf.
    #[arg(long)]
    elf_attack_power: Option<u32>,

    /// Attack power of every goblin.
    #[arg(long)]
    goblin_attack_power: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Reset only the area touched by the previous flood.
    BoundingBox,
    /// Reset the whole distance map before every flood.
    Full,
}

impl From<PolicyArg> for ClearPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::BoundingBox => ClearPolicy::BoundingBox,
            PolicyArg::Full => ClearPolicy::Full,
        }
    }
}

#[derive(Serialize)]
struct OutcomeReport {
    #[serde(flatten)]
    outcome: Outcome,
    value: Option<u64>,
}

#[derive(Serialize)]
struct CalibrationReport {
    attack_power: u32,
    #[serde(flatten)]
    outcome: OutcomeReport,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Outcome { battle, json } => outcome(&settings, &battle, json),
        Command::Replay { battle } => replay(&settings, &battle),
        Command::Calibrate {
            common,
            min_attack_power,
            max_attack_power,
            json,
        } => {
            let calibration = Calibration {
                min_attack_power: min_attack_power
                    .unwrap_or(settings.calibration.min_attack_power),
                max_attack_power: max_attack_power
                    .unwrap_or(settings.calibration.max_attack_power),
                round_limit: common.round_limit.or(settings.round_limit),
            };
            calibrate(&settings, &common, &calibration, json)
        }
    }
}

fn outcome(settings: &Settings, args: &BattleArgs, json: bool) -> Result<()> {
    let mut battle = load_battle(&args.common.layout, &battle_config(settings, args))?;
    let outcome = match args.common.round_limit.or(settings.round_limit) {
        Some(limit) => battle
            .find_outcome_within(limit)
            .with_context(|| format!("battle still running after {limit} rounds"))?,
        None => battle.find_outcome(),
    };
    tracing::info!(rounds = battle.rounds(), "battle finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_report(outcome))?);
    } else {
        println!("{}", describe(&outcome));
    }
    Ok(())
}

fn replay(settings: &Settings, args: &BattleArgs) -> Result<()> {
    let mut battle = load_battle(&args.common.layout, &battle_config(settings, args))?;
    let limit = args.common.round_limit.or(settings.round_limit);

    println!("initially:");
    print!("{}", GridDump::new(battle.world()).with_hit_points(true));
    loop {
        if limit.is_some_and(|limit| battle.rounds() >= limit) {
            bail!("battle still running after {} rounds", battle.rounds());
        }

        let finished = battle.play_round();
        println!();
        println!("after round {}:", battle.rounds());
        print!("{}", GridDump::new(battle.world()).with_hit_points(true));

        if let Some(outcome) = finished {
            println!();
            println!("{}", describe(&outcome));
            return Ok(());
        }
    }
}

fn calibrate(
    settings: &Settings,
    common: &CommonArgs,
    calibration: &Calibration,
    json: bool,
) -> Result<()> {
    let config = BattleConfig {
        clear_policy: clear_policy(settings, common),
        ..settings.battle
    };
    let battle = load_battle(&common.layout, &config)?;

    let Some(result) = calibration.search(&battle)? else {
        bail!(
            "no elf attack power in {}..={} wins without losses",
            calibration.min_attack_power,
            calibration.max_attack_power
        );
    };

    if json {
        let report = CalibrationReport {
            attack_power: result.attack_power,
            outcome: outcome_report(result.outcome),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "elves need attack power {}: {}",
            result.attack_power,
            describe(&result.outcome)
        );
    }
    Ok(())
}

fn battle_config(settings: &Settings, args: &BattleArgs) -> BattleConfig {
    BattleConfig {
        elf_attack_power: args
            .elf_attack_power
            .unwrap_or(settings.battle.elf_attack_power),
        goblin_attack_power: args
            .goblin_attack_power
            .unwrap_or(settings.battle.goblin_attack_power),
        clear_policy: clear_policy(settings, &args.common),
        ..settings.battle
    }
}

fn clear_policy(settings: &Settings, common: &CommonArgs) -> ClearPolicy {
    common
        .clear_policy
        .map_or(settings.battle.clear_policy, ClearPolicy::from)
}

fn load_battle(path: &Path, config: &BattleConfig) -> Result<Battle> {
    if config.elf_attack_power == 0 || config.goblin_attack_power == 0 {
        bail!("attack power must be positive");
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout at {}", path.display()))?;
    let layout = skirmish_layout::parse(&source)
        .with_context(|| format!("invalid layout in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        columns = layout.columns(),
        rows = layout.rows(),
        units = layout.placements().len(),
        "layout loaded"
    );
    Ok(Battle::from_layout(&layout, config))
}

fn outcome_report(outcome: Outcome) -> OutcomeReport {
    OutcomeReport {
        value: outcome.value(),
        outcome,
    }
}

fn describe(outcome: &Outcome) -> String {
    match *outcome {
        Outcome::Resolved {
            winner,
            completed_rounds,
            remaining_hit_points,
        } => {
            let side = match winner {
                Some(Team::Elf) => "elves win",
                Some(Team::Goblin) => "goblins win",
                None => "nobody survives",
            };
            format!(
                "{side} after {completed_rounds} full rounds with {remaining_hit_points} hit points left, outcome {}",
                u64::from(completed_rounds) * u64::from(remaining_hit_points)
            )
        }
        Outcome::Unresolved { rounds } => {
            format!("deadlock: nothing moved or attacked in round {rounds}")
        }
    }
}
