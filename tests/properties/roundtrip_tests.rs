use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use platcheck::generate::{arb_fragment, arb_platform_string, MAX_FRAGMENTS};
use platcheck::oracle::{self, TrialOutcome};
use platcheck::platform::Platform;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        max_global_rejects: 16_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn platform_strings_round_trip(candidate in arb_platform_string()) {
        let outcome = oracle::check_round_trip(&candidate)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assume!(outcome != TrialOutcome::ExpectedRejection);
    }

    #[test]
    fn parse_format_parse_is_stable(candidate in arb_platform_string()) {
        if let Ok(first) = candidate.parse::<Platform>() {
            let formatted = first.to_string();
            let second: Platform = formatted
                .parse()
                .expect("canonical form must re-parse");
            prop_assert_eq!(&first, &second, "candidate {:?}", candidate);
        }
    }

    #[test]
    fn rejections_carry_the_exact_input(candidate in arb_platform_string()) {
        if let Err(err) = candidate.parse::<Platform>() {
            prop_assert_eq!(err.input(), candidate.as_str());
            prop_assert_eq!(
                err.to_string(),
                format!("empty cpu in platform `{candidate}`")
            );
        }
    }

    #[test]
    fn fragments_flatten_without_separators(fragment in arb_fragment()) {
        prop_assert!(!fragment.contains('-'));
    }

    #[test]
    fn candidates_stay_within_the_fragment_bound(candidate in arb_platform_string()) {
        prop_assert!(candidate.split('-').count() <= MAX_FRAGMENTS);
    }
}
