// crates/sitestack-harness/src/retry.rs
// ============================================================================
// Module: Transient Error Retry
// Description: Retry policy for known-transient provisioning tool failures.
// Purpose: Re-run tool invocations that fail on rate limits or provider races.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`RetryPolicy`] holds substring patterns for failures known to be
//! transient (registry/plugin download hiccups, throttling, eventual
//! consistency after apply). [`run_with_retry`] re-runs an operation while its
//! failure text matches one of them, up to `max_retries` extra attempts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tracing::error;
use tracing::warn;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Description for provider download failures.
const PLUGIN_NETWORK: &str = "Failed to retrieve plugin due to transient network error.";

/// Known-transient failure patterns and their descriptions.
const DEFAULT_RETRYABLE: &[(&str, &str)] = &[
    ("read: connection reset by peer", "Connection reset while reaching a remote endpoint."),
    ("transport is closing", "Provider transport closed unexpectedly."),
    ("unable to verify signature", PLUGIN_NETWORK),
    ("unable to verify checksum", PLUGIN_NETWORK),
    ("no provider exists with the given name", PLUGIN_NETWORK),
    ("registry service is unreachable", PLUGIN_NETWORK),
    ("Error installing provider", PLUGIN_NETWORK),
    ("Failed to query available provider packages", PLUGIN_NETWORK),
    ("timeout while waiting for plugin to start", PLUGIN_NETWORK),
    ("timed out waiting for server handshake", PLUGIN_NETWORK),
    ("could not query provider registry for", PLUGIN_NETWORK),
    ("Provider produced inconsistent result after apply", "Provider eventual consistency error."),
    ("Throttling", "Cloud API rate limiting."),
    ("TooManyRequests", "Cloud API rate limiting."),
    ("RequestLimitExceeded", "Cloud API rate limiting."),
    ("SlowDown", "Object storage rate limiting."),
    ("OperationAborted", "Conflicting concurrent bucket operation."),
];

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Retry policy for provisioning tool invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay between attempts.
    pub delay: Duration,
    /// `(pattern, description)` pairs matched against failure output.
    pub retryable: Vec<(String, String)>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
            retryable: DEFAULT_RETRYABLE
                .iter()
                .map(|(pattern, description)| ((*pattern).to_string(), (*description).to_string()))
                .collect(),
        }
    }
}

impl RetryPolicy {
    /// Returns a policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
            retryable: Vec::new(),
        }
    }

    /// Returns the description of the first pattern found in `output`.
    #[must_use]
    pub fn classify(&self, output: &str) -> Option<&str> {
        self.retryable
            .iter()
            .find(|(pattern, _)| output.contains(pattern.as_str()))
            .map(|(_, description)| description.as_str())
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs `attempt` until it succeeds, fails non-transiently, or retries run out.
///
/// `failure_text` extracts the diagnostic text matched against the policy.
///
/// # Errors
///
/// Returns the last error produced by `attempt`.
pub async fn run_with_retry<T, E, F, Fut, D>(
    policy: &RetryPolicy,
    operation: &str,
    failure_text: D,
    mut attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    D: Fn(&E) -> String,
{
    let mut retries = 0u32;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let text = failure_text(&err);
                let Some(reason) = policy.classify(&text) else {
                    return Err(err);
                };
                if retries >= policy.max_retries {
                    error!(operation, retries, reason, "transient failure persisted after retries");
                    return Err(err);
                }
                retries = retries.saturating_add(1);
                warn!(
                    operation,
                    attempt = retries,
                    reason,
                    delay_ms = u64::try_from(policy.delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying after transient failure"
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
