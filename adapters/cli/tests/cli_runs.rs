use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use tempfile::TempDir;

const CLASSIC: &str = "#######
#.G...#
#...EG#
#.#.#G#
#..G#E#
#.....#
#######
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture written");
    path
}

fn skirmish(args: &[&str], layout: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .args(args)
        .arg(layout)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to invoke skirmish binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn outcome_prints_json_report() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "classic.txt", CLASSIC);

    let output = skirmish(&["outcome", "--json"], &layout);

    assert!(output.status.success(), "{output:?}");
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout is json");
    assert_eq!(report["status"], "resolved");
    assert_eq!(report["winner"], "goblin");
    assert_eq!(report["completed_rounds"], 47);
    assert_eq!(report["remaining_hit_points"], 590);
    assert_eq!(report["value"], 27_730);
}

#[test]
fn outcome_honours_attack_power_flag() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "classic.txt", CLASSIC);

    let output = skirmish(&["outcome", "--elf-attack-power", "15"], &layout);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout(&output).trim(),
        "elves win after 29 full rounds with 172 hit points left, outcome 4988"
    );
}

#[test]
fn settings_file_applies_unless_overridden() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "classic.txt", CLASSIC);
    let config = write(
        &dir,
        "skirmish.toml",
        "[battle]\nelf_attack_power = 15\nclear_policy = \"full\"\n",
    );
    let config = config.to_str().expect("utf-8 path");

    let boosted = skirmish(&["--config", config, "outcome", "--json"], &layout);
    let overridden = skirmish(
        &["--config", config, "outcome", "--json", "--elf-attack-power", "3"],
        &layout,
    );

    let boosted: serde_json::Value = serde_json::from_str(&stdout(&boosted)).expect("json");
    let overridden: serde_json::Value =
        serde_json::from_str(&stdout(&overridden)).expect("json");
    assert_eq!(boosted["value"], 4_988);
    assert_eq!(overridden["value"], 27_730);
}

#[test]
fn round_limit_exhaustion_fails() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "classic.txt", CLASSIC);

    let output = skirmish(&["outcome", "--round-limit", "5"], &layout);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("still running after 5 rounds"), "{stderr}");
}

#[test]
fn replay_prints_every_round() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "duel.txt", "#####\n#E.G#\n#####\n");

    let output = skirmish(&["replay"], &layout);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.starts_with("initially:\n#####\n#E.G#   E(200), G(200)\n"));
    assert!(text.contains("after round 1:\n#####\n#.EG#   E(197), G(197)\n"));
    assert!(text.contains("after round 2:\n#####\n#.EG#   E(194), G(194)\n"));
    assert!(text.contains("after round 67:\n#####\n#.E.#   E(2)\n"));
    assert!(text.trim_end().ends_with("elves win after 67 full rounds with 2 hit points left, outcome 134"));
}

#[test]
fn calibrate_finds_lossless_power() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "classic.txt", CLASSIC);

    let output = skirmish(&["calibrate", "--json"], &layout);

    assert!(output.status.success(), "{output:?}");
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout is json");
    assert_eq!(report["attack_power"], 15);
    assert_eq!(report["winner"], "elf");
    assert_eq!(report["value"], 4_988);
}

#[test]
fn invalid_layout_is_rejected_before_simulation() {
    let dir = TempDir::new().expect("temp dir");
    let layout = write(&dir, "broken.txt", "####\n#EX#\n####\n");

    let output = skirmish(&["outcome"], &layout);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid layout"), "{stderr}");
    assert!(stderr.contains("invalid glyph 'X'"), "{stderr}");
}
