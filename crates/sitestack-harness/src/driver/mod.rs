// crates/sitestack-harness/src/driver/mod.rs
// ============================================================================
// Module: Provisioning Driver
// Description: Interface to the external infrastructure-as-code tool.
// Purpose: Decouple scenarios from the concrete provisioning tool binary.
// Dependencies: async-trait
// ============================================================================

//! ## Overview
//! [`ProvisioningDriver`] is the lifecycle surface scenarios consume: init,
//! plan-and-show, apply, outputs, destroy, and validate. The tool itself is
//! external and used unmodified; [`TerraformCli`] shells out to it.
//! Invariants:
//! - `destroy` is idempotent and safe after a partial apply.
//! - Every operation receives the scenario's options by reference and never
//!   mutates shared state.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod terraform;

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::HarnessError;
use crate::options::ProvisioningOptions;
use crate::outputs::OutputSet;
use crate::plan::PlanResult;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use terraform::TerraformCli;

// ============================================================================
// SECTION: Driver Trait
// ============================================================================

/// Lifecycle operations of an infrastructure provisioning tool.
#[async_trait]
pub trait ProvisioningDriver: Send + Sync {
    /// Resolves providers and modules for the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Init`] on dependency resolution failure.
    async fn init(&self, options: &ProvisioningOptions) -> Result<(), HarnessError>;

    /// Computes a plan and returns its structured form.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Plan`] on invalid configuration and
    /// [`HarnessError::PlanDecode`] when the plan cannot be read.
    async fn plan_and_show(&self, options: &ProvisioningOptions)
    -> Result<PlanResult, HarnessError>;

    /// Applies the configuration and returns its outputs.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Apply`] on provisioning failure, including
    /// partial failure after some resources were created.
    async fn apply(&self, options: &ProvisioningOptions) -> Result<OutputSet, HarnessError>;

    /// Reads the current outputs.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Output`] when outputs cannot be read.
    async fn outputs(&self, options: &ProvisioningOptions) -> Result<OutputSet, HarnessError>;

    /// Destroys everything the configuration manages.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Destroy`] when destroy fails for a reason
    /// other than resources already being gone.
    async fn destroy(&self, options: &ProvisioningOptions) -> Result<(), HarnessError>;

    /// Validates configuration syntax and schema.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Validation`] on violations.
    async fn validate(&self, options: &ProvisioningOptions) -> Result<(), HarnessError>;

    /// Runs `init` followed by `apply`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    async fn init_and_apply(&self, options: &ProvisioningOptions) -> Result<OutputSet, HarnessError> {
        self.init(options).await?;
        self.apply(options).await
    }

    /// Runs `init` followed by `plan_and_show`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    async fn init_and_plan(&self, options: &ProvisioningOptions) -> Result<PlanResult, HarnessError> {
        self.init(options).await?;
        self.plan_and_show(options).await
    }

    /// Runs `init` followed by `validate`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    async fn init_and_validate(&self, options: &ProvisioningOptions) -> Result<(), HarnessError> {
        self.init(options).await?;
        self.validate(options).await
    }
}
