//! Property-based tests for flag parsing and exit-code mapping.

use std::time::Duration;

use clap::Parser;
use proptest::prelude::*;

use insucalc_core::constants::exit_codes;
use insucalc_core::gateway::LookupError;
use insucalc_lib::config::{parse_duration, AppConfig};
use insucalc_lib::errors::lookup_exit_code;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn durations_parse_in_every_unit(n in 0u64..100_000) {
        prop_assert_eq!(parse_duration(&format!("{n}ms")), Some(Duration::from_millis(n)));
        prop_assert_eq!(parse_duration(&format!("{n}s")), Some(Duration::from_secs(n)));
        prop_assert_eq!(parse_duration(&format!("{n}m")), Some(Duration::from_secs(n * 60)));
        prop_assert_eq!(parse_duration(&format!(" {n} ")), Some(Duration::from_secs(n)));
    }

    #[test]
    fn garbage_durations_are_rejected(s in "[a-z]{1,8}") {
        prop_assert_eq!(parse_duration(&s), None);
    }

    #[test]
    fn admissible_selection_flags_round_trip(age in 15u32..120, amount in 1u64..100_000) {
        let config = AppConfig::try_parse_from([
            "insucalc".to_string(),
            "--code".to_string(),
            "21686".to_string(),
            "--age".to_string(),
            age.to_string(),
            "--base-amount".to_string(),
            amount.to_string(),
        ])
        .unwrap();
        let defaults = config.selection_defaults();
        prop_assert_eq!(defaults.age, age);
        prop_assert_eq!(defaults.base_amount, amount);
    }

    #[test]
    fn status_codes_map_to_unavailable_only_for_5xx(status in 100u16..600) {
        let err = LookupError::Status { status, body: String::new() };
        let expected = if (500..600).contains(&status) {
            exit_codes::ERROR_UNAVAILABLE
        } else {
            exit_codes::ERROR_GENERIC
        };
        prop_assert_eq!(lookup_exit_code(&err), expected);
    }
}
