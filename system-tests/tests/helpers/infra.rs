// system-tests/tests/helpers/infra.rs
// ============================================================================
// Module: System Test Infrastructure
// Description: Cloud emulator fixture for the static website system-tests.
// Purpose: Provide an isolated emulator endpoint per scenario.
// Dependencies: testcontainers, sitestack-harness
// ============================================================================

//! ## Overview
//! Uses the endpoint from `SITESTACK_SYSTEM_TEST_ENDPOINT` when set, else
//! starts a LocalStack container for the lifetime of the fixture.
//! Invariants:
//! - The fixture is ready (health endpoint green) before it is returned.
//! - The hosted zone looked up by the module exists before provisioning.

use sitestack_harness::EmulatorEndpoint;
use sitestack_harness::EmulatorSession;
use system_tests::config::SystemTestConfig;
use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::ImageExt;
use testcontainers::core::IntoContainerPort;
use testcontainers::core::WaitFor;
use testcontainers::runners::AsyncRunner;
use tracing::info;

use super::readiness::wait_for_emulator_ready;
use super::timeouts::EMULATOR_READY;
use super::timeouts::resolve_timeout;

const LOCALSTACK_IMAGE: &str = "localstack/localstack";
const LOCALSTACK_TAG: &str = "3.8";
const LOCALSTACK_PORT: u16 = 4566;
const LOCALSTACK_SERVICES: &str = "s3,cloudfront,acm,route53,sts,iam";

pub struct EmulatorFixture {
    endpoint: EmulatorEndpoint,
    session: EmulatorSession,
    _container: Option<ContainerAsync<GenericImage>>,
}

impl EmulatorFixture {
    pub async fn start(config: &SystemTestConfig) -> Result<Self, String> {
        let ready_timeout = resolve_timeout(EMULATOR_READY, config);
        if let Some(url) = &config.endpoint {
            let endpoint = EmulatorEndpoint::new(url.clone()).with_region(config.region());
            wait_for_emulator_ready(&endpoint.url, ready_timeout).await?;
            return Self::connect(endpoint, None).await;
        }

        ensure_docker_available()?;
        let container = GenericImage::new(LOCALSTACK_IMAGE, LOCALSTACK_TAG)
            .with_exposed_port(LOCALSTACK_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready."))
            .with_env_var("SERVICES", LOCALSTACK_SERVICES)
            .with_env_var("AWS_DEFAULT_REGION", config.region())
            .start()
            .await
            .map_err(|err| format!("failed to start localstack container: {err}"))?;
        let port = container
            .get_host_port_ipv4(LOCALSTACK_PORT.tcp())
            .await
            .map_err(|err| format!("failed to resolve localstack port: {err}"))?;
        let endpoint =
            EmulatorEndpoint::new(format!("http://127.0.0.1:{port}")).with_region(config.region());
        info!(endpoint = %endpoint.url, "localstack container started");
        wait_for_emulator_ready(&endpoint.url, ready_timeout).await?;
        Self::connect(endpoint, Some(container)).await
    }

    async fn connect(
        endpoint: EmulatorEndpoint,
        container: Option<ContainerAsync<GenericImage>>,
    ) -> Result<Self, String> {
        let session = EmulatorSession::connect(endpoint.clone())
            .await
            .map_err(|err| format!("emulator session: {err}"))?;
        Ok(Self {
            endpoint,
            session,
            _container: container,
        })
    }

    pub const fn endpoint(&self) -> &EmulatorEndpoint {
        &self.endpoint
    }

    pub fn session(&self) -> EmulatorSession {
        self.session.clone()
    }

    /// Creates the hosted zone the module's data source looks up.
    pub async fn seed_zone(&self, zone: &str) -> Result<(), String> {
        let created = self
            .session
            .ensure_hosted_zone(zone)
            .await
            .map_err(|err| format!("failed to seed hosted zone {zone}: {err}"))?;
        info!(zone, created, "hosted zone ready");
        Ok(())
    }
}

fn ensure_docker_available() -> Result<(), String> {
    let output = std::process::Command::new("docker")
        .arg("info")
        .output()
        .map_err(|err| format!("docker info failed: {err}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("docker info failed: {stderr}"));
    }
    Ok(())
}
