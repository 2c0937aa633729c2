// crates/sitestack-harness/src/verify.rs
// ============================================================================
// Module: Verification Checks
// Description: Three-valued check results and per-scenario aggregation.
// Purpose: Report passed, failed, and skipped sub-checks uniformly.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! Each sub-check yields a [`CheckResult`] whose outcome is passed, failed
//! (with expected and actual renderings), or skipped (with a reason).
//! [`VerificationReport`] collects results without aborting sibling checks;
//! [`SkipPolicy`] decides whether skips affect the overall verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::emulator::QueryError;
use crate::outputs::OutputSet;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Outcome of one sub-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The check held.
    Passed,
    /// The check did not hold.
    Failed {
        /// Expected value rendering.
        expected: String,
        /// Actual value rendering.
        actual: String,
    },
    /// The check could not run against this emulator.
    Skipped {
        /// Why the check was skipped.
        reason: String,
    },
}

impl CheckOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Named sub-check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Check name.
    pub name: String,
    /// Check outcome.
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckResult {
    /// Builds a passed result.
    #[must_use]
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: CheckOutcome::Passed,
        }
    }

    /// Builds a failed result.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            outcome: CheckOutcome::Failed {
                expected: expected.into(),
                actual: actual.into(),
            },
        }
    }

    /// Builds a skipped result.
    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: CheckOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// Returns true when the check failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Failed { .. })
    }

    /// Returns true when the check was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Skipped { .. })
    }
}

// ============================================================================
// SECTION: Check Constructors
// ============================================================================

/// Checks that `actual` equals `expected`.
#[must_use]
pub fn check_eq<T>(name: impl Into<String>, expected: &T, actual: &T) -> CheckResult
where
    T: PartialEq + Display + ?Sized,
{
    if expected == actual {
        CheckResult::passed(name)
    } else {
        CheckResult::failed(name, expected.to_string(), actual.to_string())
    }
}

/// Checks that a condition holds, describing the expectation on failure.
#[must_use]
pub fn check_true(
    name: impl Into<String>,
    condition: bool,
    expected: &str,
    actual: impl Display,
) -> CheckResult {
    if condition {
        CheckResult::passed(name)
    } else {
        CheckResult::failed(name, expected, actual.to_string())
    }
}

/// Checks that a string is not empty after trimming.
#[must_use]
pub fn check_non_empty(name: impl Into<String>, actual: &str) -> CheckResult {
    check_true(name, !actual.trim().is_empty(), "non-empty string", format!("{actual:?}"))
}

/// Checks that a count reaches a minimum.
#[must_use]
pub fn check_min_count(name: impl Into<String>, minimum: usize, actual: usize) -> CheckResult {
    check_true(name, actual >= minimum, &format!(">= {minimum}"), actual)
}

/// Checks that output `name` equals `expected`; a missing output fails the check.
#[must_use]
pub fn check_output_eq(outputs: &OutputSet, name: &str, expected: &str) -> CheckResult {
    match outputs.get(name) {
        Some(actual) => check_eq(format!("output.{name}"), expected, actual),
        None => CheckResult::failed(format!("output.{name}"), expected, "missing output"),
    }
}

/// Checks that output `name` is present and non-empty.
#[must_use]
pub fn check_output_non_empty(outputs: &OutputSet, name: &str) -> CheckResult {
    match outputs.get(name) {
        Some(actual) => check_non_empty(format!("output.{name}"), actual),
        None => CheckResult::failed(format!("output.{name}"), "non-empty string", "missing output"),
    }
}

/// Converts an emulator query into a check.
///
/// Unsupported emulator features become skips; any other query error fails.
#[must_use]
pub fn from_query<T, F>(name: impl Into<String>, result: Result<T, QueryError>, eval: F) -> CheckResult
where
    F: FnOnce(T) -> CheckOutcome,
{
    match result {
        Ok(value) => CheckResult {
            name: name.into(),
            outcome: eval(value),
        },
        Err(err @ QueryError::Unsupported { .. }) => CheckResult::skipped(name, err.to_string()),
        Err(err) => CheckResult::failed(name, "successful emulator query", err.to_string()),
    }
}

/// Builds an equality outcome for use inside [`from_query`].
#[must_use]
pub fn outcome_eq<T>(expected: &T, actual: &T) -> CheckOutcome
where
    T: PartialEq + Display + ?Sized,
{
    if expected == actual {
        CheckOutcome::Passed
    } else {
        CheckOutcome::Failed {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Whether skipped checks count against the verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Skips are reported but do not fail the scenario.
    #[default]
    Tolerate,
    /// Any skip fails the scenario.
    Fail,
}

/// Overall verification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No failures (and no skips under [`SkipPolicy::Fail`]).
    Pass,
    /// At least one failing check.
    Fail,
}

/// Ordered collection of sub-check results for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Results in record order.
    results: Vec<CheckResult>,
}

impl VerificationReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    /// Records a result and logs non-passing outcomes.
    pub fn record(&mut self, result: CheckResult) -> &mut Self {
        match &result.outcome {
            CheckOutcome::Passed => info!(check = %result.name, "check passed"),
            CheckOutcome::Failed {
                expected,
                actual,
            } => warn!(check = %result.name, %expected, %actual, "check failed"),
            CheckOutcome::Skipped {
                reason,
            } => warn!(check = %result.name, %reason, "check skipped"),
        }
        self.results.push(result);
        self
    }

    /// Appends every result from another report.
    pub fn merge(&mut self, other: Self) {
        self.results.extend(other.results);
    }

    /// Returns all results in record order.
    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Counts passed checks.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.outcome == CheckOutcome::Passed).count()
    }

    /// Counts failed checks.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|result| result.is_failed()).count()
    }

    /// Counts skipped checks.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|result| result.is_skipped()).count()
    }

    /// Returns the verdict under a skip policy.
    #[must_use]
    pub fn verdict(&self, policy: SkipPolicy) -> Verdict {
        let skips_fail = policy == SkipPolicy::Fail && self.skipped() > 0;
        if self.failed() > 0 || skips_fail { Verdict::Fail } else { Verdict::Pass }
    }

    /// Renders failing (and, when counted, skipped) checks one per line.
    #[must_use]
    pub fn describe_failures(&self, policy: SkipPolicy) -> String {
        self.results
            .iter()
            .filter(|result| result.is_failed() || (policy == SkipPolicy::Fail && result.is_skipped()))
            .map(|result| match &result.outcome {
                CheckOutcome::Failed {
                    expected,
                    actual,
                } => format!("{}: expected {expected}, got {actual}", result.name),
                CheckOutcome::Skipped {
                    reason,
                } => format!("{}: skipped ({reason})", result.name),
                CheckOutcome::Passed => result.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod verify_tests;
