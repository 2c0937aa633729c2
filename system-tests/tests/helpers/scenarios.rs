// system-tests/tests/helpers/scenarios.rs
// ============================================================================
// Module: Scenario Fixtures
// Description: Example configuration fixtures for system-tests.
// Purpose: Provide deterministic, reusable site inputs and options.
// Dependencies: sitestack-harness, system-tests
// ============================================================================

use std::path::Path;

use sitestack_harness::EmulatorEndpoint;
use sitestack_harness::OptionsBuilder;
use sitestack_harness::ProvisioningOptions;
use system_tests::config::SystemTestConfig;

/// Input fixture for one example configuration of the module.
#[derive(Debug, Clone, Copy)]
pub struct SiteFixture {
    /// Directory name under `examples/`.
    pub example: &'static str,
    /// Primary website domain.
    pub domain_main: &'static str,
    /// Redirect domain, when the example declares one.
    pub domain_redirect: Option<&'static str>,
    /// Hosted zone the records are created in.
    pub zone_root: &'static str,
    /// Single-page application routing.
    pub support_spa: bool,
    /// Minimum planned resource addresses.
    pub min_planned: usize,
}

impl SiteFixture {
    /// Basic site with a redirect domain.
    pub const BASIC: Self = Self {
        example: "basic",
        domain_main: "test.example.com",
        domain_redirect: Some("www.test.example.com"),
        zone_root: "example.com",
        support_spa: false,
        min_planned: 20,
    };

    /// Single-page application site.
    pub const SPA: Self = Self {
        example: "spa",
        domain_main: "spa.example.com",
        domain_redirect: None,
        zone_root: "example.com",
        support_spa: true,
        min_planned: 15,
    };

    /// SPA configuration under its own domain, for tests that destroy out of band.
    pub const IDEMPOTENT: Self = Self {
        example: "spa",
        domain_main: "idem.example.com",
        domain_redirect: None,
        zone_root: "example.com",
        support_spa: true,
        min_planned: 15,
    };

    /// Every fixture applied by the lifecycle suites.
    pub const APPLIED: [Self; 3] = [Self::BASIC, Self::SPA, Self::IDEMPOTENT];

    pub fn root_bucket(&self) -> String {
        format!("{}-root", self.domain_main)
    }

    pub fn logs_bucket(&self) -> String {
        format!("{}-logs", self.domain_main)
    }

    pub fn redirect_bucket(&self) -> String {
        format!("{}-redirect", self.domain_main)
    }

    /// Builds per-scenario options with state and tool data under `work_dir`.
    pub fn options(
        &self,
        config: &SystemTestConfig,
        endpoint: Option<&EmulatorEndpoint>,
        work_dir: &Path,
    ) -> ProvisioningOptions {
        let mut builder = OptionsBuilder::new(config.example_dir(self.example))
            .var("website-domain-main", self.domain_main)
            .var("domains-zone-root", self.zone_root)
            .var("support-spa", self.support_spa)
            .region(config.region())
            .plan_path(work_dir.join("tfplan"))
            .state_path(work_dir.join("terraform.tfstate"))
            .data_dir(work_dir.join(".terraform"));
        if let Some(redirect) = self.domain_redirect {
            builder = builder.var("website-domain-redirect", redirect);
        }
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint(endpoint.url.clone());
        }
        builder.build()
    }
}
