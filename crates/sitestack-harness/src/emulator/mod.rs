// crates/sitestack-harness/src/emulator/mod.rs
// ============================================================================
// Module: Cloud Emulator
// Description: Emulator endpoint, session factory, and direct resource queries.
// Purpose: Inspect provisioned resources without going through the driver.
// Dependencies: aws-config, aws-sdk-s3, aws-sdk-cloudfront, aws-sdk-route53, url
// ============================================================================

//! ## Overview
//! [`EmulatorSession`] is a cloud API session bound to a local emulator
//! endpoint with static placeholder credentials and path-style addressing.
//! Queries return typed snapshots or a [`QueryError`]; failures caused by
//! the emulator lacking an API are classified as
//! [`QueryError::Unsupported`] so checks can record a skip.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod classify;
mod session;


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use classify::QueryError;
pub use classify::is_unsupported_response;
pub use session::BucketEncryption;
pub use session::BucketLogging;
pub use session::BucketVersioning;
pub use session::BucketWebsite;
pub use session::DistributionSnapshot;
pub use session::EmulatorEndpoint;
pub use session::EmulatorSession;
pub use session::PublicAccessBlock;
