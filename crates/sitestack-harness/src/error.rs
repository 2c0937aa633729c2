// crates/sitestack-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for provisioning, emulator, and assertion failures.
// Purpose: Keep failure classification stable across scenarios and reports.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every fallible harness operation returns [`HarnessError`]. Driver lifecycle
//! failures carry a [`DriverFailure`] describing the operation, the working
//! directory, and the tool's diagnostic output so reports can surface them
//! verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Driver Failure Context
// ============================================================================

/// Context captured when a provisioning tool invocation fails.
///
/// # Invariants
/// - `detail` holds the tail of the tool's diagnostic output, never secrets from the env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverFailure {
    /// Driver operation label (for example `apply`).
    pub operation: &'static str,
    /// Working directory the tool ran in.
    pub directory: PathBuf,
    /// Process exit code when the tool ran to completion.
    pub exit_code: Option<i32>,
    /// Diagnostic output tail.
    pub detail: String,
}

impl fmt::Display for DriverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.exit_code.map_or_else(|| "none".to_string(), |code| code.to_string());
        write!(
            f,
            "{} in {} (exit code {code}): {}",
            self.operation,
            self.directory.display(),
            self.detail
        )
    }
}

// ============================================================================
// SECTION: Harness Error
// ============================================================================

/// Harness error taxonomy.
///
/// # Invariants
/// - Variants are stable for error classification in scenario reports.
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// Bad endpoint, credentials, or option setup.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Provider or module dependency resolution failed.
    #[error("init failed: {0}")]
    Init(DriverFailure),
    /// Plan computation failed.
    #[error("plan failed: {0}")]
    Plan(DriverFailure),
    /// Apply failed, possibly after partially creating resources.
    #[error("apply failed: {0}")]
    Apply(DriverFailure),
    /// Destroy failed.
    #[error("destroy failed: {0}")]
    Destroy(DriverFailure),
    /// Configuration failed schema or syntax validation.
    #[error("validation failed: {0}")]
    Validation(DriverFailure),
    /// Output retrieval failed.
    #[error("output retrieval failed: {0}")]
    Output(DriverFailure),
    /// The provisioning tool binary could not be started.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Operating system error message.
        message: String,
    },
    /// Filesystem read or walk failure.
    #[error("io error at {}: {message}", path.display())]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// The emulator does not implement the requested API.
    #[error("feature unsupported by emulator: {operation}: {detail}")]
    FeatureUnsupported {
        /// Emulator operation label.
        operation: &'static str,
        /// Emulator response detail.
        detail: String,
    },
    /// A direct emulator query failed for a reason other than a missing API.
    #[error("emulator query failed: {0}")]
    Emulator(String),
    /// Expected and actual values differ.
    #[error("assertion {check} failed: expected {expected}, got {actual}")]
    Assertion {
        /// Check name.
        check: String,
        /// Expected value rendering.
        expected: String,
        /// Actual value rendering.
        actual: String,
    },
    /// A tagged value was read as the wrong kind.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Requested kind.
        expected: &'static str,
        /// Stored kind.
        actual: &'static str,
    },
    /// Plan does not contain the requested resource address.
    #[error("resource not planned: {0}")]
    MissingResource(String),
    /// Attribute set does not contain the requested attribute.
    #[error("attribute missing: {0}")]
    MissingAttribute(String),
    /// Output set does not contain the requested output.
    #[error("output missing: {0}")]
    MissingOutput(String),
    /// Plan or output JSON could not be decoded.
    #[error("plan decode error: {0}")]
    PlanDecode(String),
    /// Scenario lifecycle transition is not allowed from the current state.
    #[error("invalid scenario transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state label.
        from: &'static str,
        /// Requested state label.
        to: &'static str,
    },
    /// A lifecycle or verification step exceeded its deadline.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Step label.
        operation: &'static str,
        /// Deadline in seconds.
        seconds: u64,
    },
    /// The verification task panicked.
    #[error("verification panicked: {0}")]
    VerificationPanicked(String),
}

impl HarnessError {
    /// Builds an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Init(_) => "init",
            Self::Plan(_) => "plan",
            Self::Apply(_) => "apply",
            Self::Destroy(_) => "destroy",
            Self::Validation(_) => "validation",
            Self::Output(_) => "output",
            Self::Spawn { .. } => "spawn",
            Self::Io { .. } => "io",
            Self::FeatureUnsupported { .. } => "feature_unsupported",
            Self::Emulator(_) => "emulator",
            Self::Assertion { .. } => "assertion",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::MissingResource(_) => "missing_resource",
            Self::MissingAttribute(_) => "missing_attribute",
            Self::MissingOutput(_) => "missing_output",
            Self::PlanDecode(_) => "plan_decode",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Timeout { .. } => "timeout",
            Self::VerificationPanicked(_) => "verification_panicked",
        }
    }
}
