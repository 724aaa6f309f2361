//! Property-based tests for the round engine.
//!
//! Random walled caverns are generated and battled out with a round limit.

use proptest::prelude::*;

use skirmish_core::{BattleConfig, ClearPolicy, Outcome, Team};
use skirmish_system_battle::Battle;
use skirmish_world::{invariants, query};

const ROUND_LIMIT: u32 = 400;

fn glyph() -> impl Strategy<Value = char> {
    prop_oneof![
        6 => Just('.'),
        2 => Just('#'),
        1 => Just('E'),
        1 => Just('G'),
    ]
}

fn cavern() -> impl Strategy<Value = String> {
    (3_usize..10, 3_usize..10).prop_flat_map(|(width, height)| {
        prop::collection::vec(prop::collection::vec(glyph(), width), height).prop_map(
            move |interior| {
                let wall = "#".repeat(width + 2);
                let mut source = String::new();
                source.push_str(&wall);
                source.push('\n');
                for row in interior {
                    source.push('#');
                    source.extend(row);
                    source.push_str("#\n");
                }
                source.push_str(&wall);
                source
            },
        )
    })
}

fn battle(source: &str, policy: ClearPolicy, elf_attack_power: u32) -> Battle {
    let layout = skirmish_layout::parse(source).expect("generated layout parses");
    let config = BattleConfig {
        elf_attack_power,
        clear_policy: policy,
        ..BattleConfig::default()
    };
    Battle::from_layout(&layout, &config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// World invariants hold after every round and hit points never grow.
    #[test]
    fn prop_invariants_hold_every_round(source in cavern(), power in 3_u32..40) {
        let mut battle = battle(&source, ClearPolicy::BoundingBox, power);
        let mut previous = total_hit_points(&battle);

        for _ in 0..ROUND_LIMIT {
            let report = battle.simulate();
            prop_assert!(invariants::check(battle.world()).is_empty());

            let current = total_hit_points(&battle);
            prop_assert!(current <= previous);
            previous = current;

            if !report.advanced || battle.outcome_reached().is_some() {
                break;
            }
        }
    }

    /// Both distance map reset strategies drive the same battle.
    #[test]
    fn prop_clear_policies_agree(source in cavern(), power in 3_u32..40) {
        let mut boxed = battle(&source, ClearPolicy::BoundingBox, power);
        let mut full = battle(&source, ClearPolicy::Full, power);

        let left = boxed.find_outcome_within(ROUND_LIMIT);
        let right = full.find_outcome_within(ROUND_LIMIT);

        prop_assert_eq!(left, right);
        let left_units: Vec<_> = query::units(boxed.world()).copied().collect();
        let right_units: Vec<_> = query::units(full.world()).copied().collect();
        prop_assert_eq!(left_units, right_units);
    }

    /// Resolved battles leave at most one team standing.
    #[test]
    fn prop_resolved_battles_have_one_side_left(source in cavern()) {
        let mut battle = battle(&source, ClearPolicy::BoundingBox, 3);

        if let Some(Outcome::Resolved { winner, completed_rounds, remaining_hit_points }) =
            battle.find_outcome_within(ROUND_LIMIT)
        {
            prop_assert!(completed_rounds <= battle.rounds());
            prop_assert_eq!(battle.winner(), winner);
            prop_assert_eq!(Some(remaining_hit_points), battle.outcome_reached());
            match winner {
                Some(team) => prop_assert_eq!(battle.live_unit_count(team.enemy()), 0),
                None => prop_assert_eq!(remaining_hit_points, 0),
            }
        }
    }
}

fn total_hit_points(battle: &Battle) -> u32 {
    Team::ALL
        .into_iter()
        .map(|team| query::team(battle.world(), team).hit_points)
        .sum()
}
