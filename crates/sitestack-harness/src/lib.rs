// crates/sitestack-harness/src/lib.rs
// ============================================================================
// Module: Sitestack Harness
// Description: Plan + apply verification harness for infrastructure modules.
// Purpose: Drive a provisioning tool against a local cloud emulator and verify results.
// Dependencies: aws-config, aws-sdk-s3, aws-sdk-cloudfront, tokio, tracing
// ============================================================================

//! ## Overview
//! This crate provides the reusable pieces of a "plan + apply" verification
//! harness: a file aggregator for configuration sources, an emulator session
//! factory, an options builder, the provisioning driver interface (with a
//! Terraform CLI implementation), tagged plan/output models, three-valued
//! checks, and a scenario lifecycle that always tears down.
//! Invariants:
//! - Scenarios never mutate process-wide environment state.
//! - Teardown runs exactly once per executed scenario.
//! - Unsupported emulator features are recorded as skips, never failures.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod driver;
pub mod emulator;
pub mod error;
pub mod options;
pub mod outputs;
pub mod plan;
pub mod retry;
pub mod scenario;
pub mod sources;
pub mod value;
pub mod verify;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use driver::ProvisioningDriver;
pub use driver::TerraformCli;
pub use emulator::EmulatorEndpoint;
pub use emulator::EmulatorSession;
pub use emulator::QueryError;
pub use error::DriverFailure;
pub use error::HarnessError;
pub use options::OptionsBuilder;
pub use options::ProvisioningOptions;
pub use options::VarValue;
pub use outputs::OutputSet;
pub use plan::PlanResult;
pub use plan::ResourceChange;
pub use retry::RetryPolicy;
pub use scenario::LifecycleMode;
pub use scenario::Scenario;
pub use scenario::ScenarioContext;
pub use scenario::ScenarioReport;
pub use scenario::ScenarioState;
pub use sources::SourceTree;
pub use sources::read_config_sources;
pub use value::AttributeSet;
pub use value::AttributeValue;
pub use verify::CheckOutcome;
pub use verify::CheckResult;
pub use verify::SkipPolicy;
pub use verify::Verdict;
pub use verify::VerificationReport;
