// crates/sitestack-harness/src/emulator/classify.rs
// ============================================================================
// Module: Emulator Error Classification
// Description: Split emulator query failures into unsupported vs. genuine.
// Purpose: Tolerate emulator fidelity gaps without masking provisioning defects.
// Dependencies: aws-sdk-s3
// ============================================================================

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::error::SdkError;
use thiserror::Error;

use crate::error::HarnessError;

/// Service error codes emulators return for unimplemented APIs.
const UNSUPPORTED_CODES: &[&str] =
    &["NotImplemented", "NotImplementedException", "UnsupportedOperation"];
/// LocalStack's wording for unimplemented APIs; generic service wording is not matched.
const UNSUPPORTED_MESSAGES: &[&str] = &["not yet implemented", "has not yet been emulated"];
/// Service codes returned when a create loses a race with an identical create.
const ALREADY_EXISTS_CODES: &[&str] = &["HostedZoneAlreadyExists"];
/// HTTP status for unimplemented operations.
const STATUS_NOT_IMPLEMENTED: u16 = 501;

/// Direct emulator query failure.
///
/// # Invariants
/// - `Unsupported` is reserved for emulator API gaps and converts to a skip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The emulator does not implement the operation.
    #[error("{operation} unsupported by emulator: {detail}")]
    Unsupported {
        /// Query label.
        operation: &'static str,
        /// Emulator response detail.
        detail: String,
    },
    /// The service rejected the request or the transport failed.
    #[error("{operation} failed ({code}): {detail}")]
    Service {
        /// Query label.
        operation: &'static str,
        /// Service error code, or `unknown`.
        code: String,
        /// Error detail.
        detail: String,
    },
}

impl QueryError {
    /// Returns true for emulator API gaps.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Builds a query error from an SDK failure.
    pub(crate) fn from_sdk<E>(operation: &'static str, err: &SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        let code = err.code();
        let status = err.raw_response().map(|response| response.status().as_u16());
        let detail = DisplayErrorContext(err).to_string();
        if is_unsupported_response(code, status, err.message().unwrap_or(&detail)) {
            return Self::Unsupported {
                operation,
                detail,
            };
        }
        Self::Service {
            operation,
            code: code.unwrap_or("unknown").to_string(),
            detail,
        }
    }
}

impl From<QueryError> for HarnessError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Unsupported {
                operation,
                detail,
            } => Self::FeatureUnsupported {
                operation,
                detail,
            },
            QueryError::Service {
                operation,
                code,
                detail,
            } => Self::Emulator(format!("{operation} failed ({code}): {detail}")),
        }
    }
}

/// Returns true when a service response indicates an unimplemented API.
#[must_use]
pub fn is_unsupported_response(code: Option<&str>, status: Option<u16>, message: &str) -> bool {
    if status == Some(STATUS_NOT_IMPLEMENTED) {
        return true;
    }
    if code.is_some_and(|code| UNSUPPORTED_CODES.contains(&code)) {
        return true;
    }
    let lowered = message.to_ascii_lowercase();
    UNSUPPORTED_MESSAGES.iter().any(|fragment| lowered.contains(fragment))
}

/// Returns true when a create failed because the resource already exists.
#[must_use]
pub(crate) fn is_already_exists(code: Option<&str>) -> bool {
    code.is_some_and(|code| ALREADY_EXISTS_CODES.contains(&code))
}
