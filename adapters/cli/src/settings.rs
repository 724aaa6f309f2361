//! Optional TOML settings file shared by all subcommands.
//!
//! ```toml
//! round_limit = 500
//!
//! [battle]
//! elf_attack_power = 3
//! clear_policy = "full"
//!
//! [calibration]
//! min_attack_power = 4
//! max_attack_power = 200
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use skirmish_core::BattleConfig;
use skirmish_system_calibration::Calibration;

/// Settings loaded from disk; every table and field is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) battle: BattleConfig,
    pub(crate) calibration: Calibration,
    pub(crate) round_limit: Option<u32>,
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when no file is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file at {}", path.display()))?;
        let settings = Self::parse(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::ClearPolicy;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::parse("").expect("empty settings parse");

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.calibration.min_attack_power, 4);
        assert_eq!(settings.battle.starting_hit_points, 200);
    }

    #[test]
    fn tables_override_selected_fields() {
        let settings = Settings::parse(
            r#"
round_limit = 150

[battle]
goblin_attack_power = 5
clear_policy = "full"

[calibration]
max_attack_power = 60
"#,
        )
        .expect("settings parse");

        assert_eq!(settings.round_limit, Some(150));
        assert_eq!(settings.battle.goblin_attack_power, 5);
        assert_eq!(settings.battle.elf_attack_power, 3);
        assert_eq!(settings.battle.clear_policy, ClearPolicy::Full);
        assert_eq!(settings.calibration.min_attack_power, 4);
        assert_eq!(settings.calibration.max_attack_power, 60);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Settings::parse("rounds = 3").expect_err("unknown key rejected");

        assert!(format!("{error:#}").contains("unknown field"));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let error = Settings::load(Some(Path::new("/nonexistent/skirmish.toml")))
            .expect_err("missing file rejected");

        assert!(error.to_string().contains("/nonexistent/skirmish.toml"));
    }
}
