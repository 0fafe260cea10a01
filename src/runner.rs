//! Sequential property runner for the round-trip oracle.
//!
//! Draws candidate strings from the generator, classifies each trial, and
//! stops at the first failure with a shrunk reproducer. Trials run strictly
//! in sequence; the only shared state is the runner-owned RNG, advanced
//! once per draw.

use std::time::Instant;

use proptest::strategy::{Strategy, ValueTree};
use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{PlatcheckError, Result};
use crate::generate;
use crate::oracle::{self, TrialOutcome};

/// Options controlling a harness run. Passed in explicitly; there is no
/// ambient configuration.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Successful trials required for an overall pass.
    pub trials: u64,

    /// Total expected-rejection discards tolerated across the run.
    pub max_discards: u64,

    /// Expected-rejection discards tolerated back to back.
    pub max_consecutive_discards: u64,

    /// Bound on shrink probes after a failure.
    pub max_shrink_iters: u64,

    /// Fixed RNG seed for a reproducible run; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            trials: 2000,
            max_discards: 10_000,
            max_consecutive_discards: 500,
            max_shrink_iters: 1024,
            seed: None,
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The trial quota was reached without a failure.
    Passed,
    /// A trial exposed a bug.
    Failed,
}

/// Diagnostic payload for a failed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    /// The candidate that first exposed the failure.
    pub candidate: String,

    /// Error detail for the original candidate, including both descriptor
    /// representations for a round-trip mismatch.
    pub detail: String,

    /// Simplest candidate still reproducing the failure.
    pub shrunk: String,

    /// Error detail for the shrunk candidate.
    pub shrunk_detail: String,

    /// Shrink probes spent finding it.
    pub shrink_iters: u64,
}

/// Result of one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Terminal state.
    pub status: RunStatus,

    /// Successful trials executed.
    pub trials_run: u64,

    /// Expected rejections discarded along the way.
    pub discarded: u64,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Failure payload when `status` is [`RunStatus::Failed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReport>,
}

impl RunReport {
    /// Returns true if the run passed.
    pub fn success(&self) -> bool {
        self.status == RunStatus::Passed
    }
}

/// Discard accounting for the trial loop.
///
/// Expected rejections do not count toward the quota; they are bounded in
/// total and back to back so a skewed generator cannot loop forever.
#[derive(Debug)]
struct DiscardBudget {
    max_total: u64,
    max_consecutive: u64,
    total: u64,
    consecutive: u64,
}

impl DiscardBudget {
    fn new(options: &HarnessOptions) -> Self {
        Self {
            max_total: options.max_discards,
            max_consecutive: options.max_consecutive_discards,
            total: 0,
            consecutive: 0,
        }
    }

    fn record_discard(&mut self, trials_completed: u64) -> Result<()> {
        self.total += 1;
        self.consecutive += 1;
        if self.total > self.max_total || self.consecutive > self.max_consecutive {
            return Err(PlatcheckError::GeneratorExhausted {
                discards: self.total,
                consecutive: self.consecutive,
                trials_completed,
            });
        }
        Ok(())
    }

    fn record_success(&mut self) {
        self.consecutive = 0;
    }
}

/// Runner for round-trip property trials.
pub struct RoundTripRunner {
    options: HarnessOptions,
}

impl RoundTripRunner {
    /// Create a runner with the given options.
    pub fn new(options: HarnessOptions) -> Self {
        Self { options }
    }

    /// Run trials until the quota is met, a failure is found, or the
    /// discard budget is exhausted.
    pub fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        let strategy = generate::arb_platform_string();
        let mut runner = self.test_runner();
        let mut budget = DiscardBudget::new(&self.options);
        let mut passed: u64 = 0;

        info!(trials = self.options.trials, "starting round-trip run");

        while passed < self.options.trials {
            let mut tree = strategy
                .new_tree(&mut runner)
                .map_err(|reason| PlatcheckError::Generation(reason.to_string()))?;
            let candidate = tree.current();
            trace!(candidate = %candidate, "trial");

            match oracle::check_round_trip(&candidate) {
                Ok(TrialOutcome::Pass) => {
                    passed += 1;
                    budget.record_success();
                }
                Ok(TrialOutcome::ExpectedRejection) => {
                    debug!(candidate = %candidate, "discarded expected rejection");
                    budget.record_discard(passed)?;
                }
                Err(error) => {
                    warn!(candidate = %candidate, %error, "failure found, shrinking");
                    let failure = self.shrink(&mut tree, candidate, &error);
                    return Ok(RunReport {
                        status: RunStatus::Failed,
                        trials_run: passed,
                        discarded: budget.total,
                        duration_ms: elapsed_ms(start),
                        failure: Some(failure),
                    });
                }
            }
        }

        info!(
            trials = passed,
            discarded = budget.total,
            "round-trip run passed"
        );

        Ok(RunReport {
            status: RunStatus::Passed,
            trials_run: passed,
            discarded: budget.total,
            duration_ms: elapsed_ms(start),
            failure: None,
        })
    }

    /// Binary-search the failing tree down to a minimal reproducer,
    /// re-invoking the oracle at every probe.
    fn shrink<T: ValueTree<Value = String>>(
        &self,
        tree: &mut T,
        candidate: String,
        error: &PlatcheckError,
    ) -> FailureReport {
        let (shrunk, shrunk_detail, shrink_iters) = shrink_tree(
            tree,
            |probe| oracle::check_round_trip(probe).err().map(|e| e.to_string()),
            self.options.max_shrink_iters,
        )
        .unwrap_or_else(|| (candidate.clone(), error.to_string(), 0));

        debug!(shrunk = %shrunk, iters = shrink_iters, "shrinking finished");

        FailureReport {
            candidate,
            detail: error.to_string(),
            shrunk,
            shrunk_detail,
            shrink_iters,
        }
    }

    fn test_runner(&self) -> TestRunner {
        let config = ProptestConfig {
            failure_persistence: None,
            ..ProptestConfig::default()
        };
        match self.options.seed {
            Some(seed) => {
                // Spread the 64-bit seed across the 256-bit RNG seed.
                let mut bytes = [0u8; 32];
                for (i, b) in seed.to_le_bytes().iter().cycle().take(32).enumerate() {
                    bytes[i] = *b;
                }
                TestRunner::new_with_rng(config, TestRng::from_seed(RngAlgorithm::ChaCha, &bytes))
            }
            None => TestRunner::new(config),
        }
    }
}

/// Simplify/complicate search over a failing [`ValueTree`].
///
/// `failure_of` returns the error detail when the probe still fails.
/// Returns the last failing value, its detail, and the probes spent, or
/// `None` when the tree admits no simplification at all.
fn shrink_tree<T: ValueTree<Value = String>>(
    tree: &mut T,
    failure_of: impl Fn(&str) -> Option<String>,
    max_iters: u64,
) -> Option<(String, String, u64)> {
    let mut last_failure: Option<(String, String)> = None;
    let mut iters: u64 = 0;

    if !tree.simplify() {
        return None;
    }

    loop {
        iters += 1;
        let probe = tree.current();
        match failure_of(&probe) {
            Some(detail) => {
                last_failure = Some((probe, detail));
                if iters >= max_iters || !tree.simplify() {
                    break;
                }
            }
            None => {
                if iters >= max_iters || !tree.complicate() {
                    break;
                }
            }
        }
    }

    last_failure.map(|(value, detail)| (value, detail, iters))
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
