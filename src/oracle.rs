//! Round-trip oracle: one candidate string in, one verdict out.
//!
//! Parse the candidate, format the descriptor, parse the result, and
//! require the two descriptors to be equal. Exactly one refusal is
//! tolerated: the parser rejecting an empty CPU field for the candidate it
//! was actually given. Every other parse error, and any descriptor
//! mismatch, is a bug and propagates.

use crate::error::{PlatcheckError, Result};
use crate::platform::{ParseError, Platform};

/// Outcome of a trial that did not expose a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Parsed and round-tripped cleanly; counts toward the trial quota.
    Pass,
    /// The single tolerated rejection; excluded from the tally.
    ExpectedRejection,
}

/// Check one candidate. Pure: no retries, no state.
pub fn check_round_trip(candidate: &str) -> Result<TrialOutcome> {
    let first: Platform = match candidate.parse() {
        Ok(platform) => platform,
        // Matching the carried input, not just the variant, keeps a
        // misattributed rejection from masquerading as the expected one.
        Err(ParseError::EmptyCpu { ref input }) if input == candidate => {
            return Ok(TrialOutcome::ExpectedRejection);
        }
        Err(source) => {
            return Err(PlatcheckError::UnexpectedParse {
                input: candidate.to_owned(),
                source,
            });
        }
    };

    let formatted = first.to_string();
    let second: Platform =
        formatted
            .parse()
            .map_err(|source| PlatcheckError::UnexpectedParse {
                input: formatted.clone(),
                source,
            })?;

    if first != second {
        return Err(PlatcheckError::RoundTripMismatch {
            candidate: candidate.to_owned(),
            first: first.to_string(),
            first_debug: format!("{first:?}"),
            second: second.to_string(),
            second_debug: format!("{second:?}"),
        });
    }

    Ok(TrialOutcome::Pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_an_expected_rejection() {
        assert_eq!(
            check_round_trip("").unwrap(),
            TrialOutcome::ExpectedRejection
        );
    }

    #[test]
    fn leading_separator_is_an_expected_rejection() {
        assert_eq!(
            check_round_trip("-linux").unwrap(),
            TrialOutcome::ExpectedRejection
        );
    }

    #[test]
    fn well_formed_platforms_pass() {
        assert_eq!(check_round_trip("x86_64-linux").unwrap(), TrialOutcome::Pass);
        assert_eq!(
            check_round_trip("arm64-darwin-20").unwrap(),
            TrialOutcome::Pass
        );
    }

    #[test]
    fn malformed_version_tokens_still_round_trip() {
        // `1..0` lands in the CPU slot and must parse consistently rather
        // than raise anything beyond the tolerated rejection.
        assert_eq!(check_round_trip("1..0-x86").unwrap(), TrialOutcome::Pass);
    }

    #[test]
    fn maximal_candidates_finish() {
        let fragment = "aarch64darwinmswin6412299gnueabihf".repeat(8);
        let candidate = vec![fragment; 5].join("-");
        assert_eq!(check_round_trip(&candidate).unwrap(), TrialOutcome::Pass);
    }
}
