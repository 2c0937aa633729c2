// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness checks for the cloud emulator.
// Purpose: Ensure the emulator is ready without arbitrary sleeps.
// Dependencies: reqwest, serde_json, tokio
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use tokio::time::sleep;

/// Health endpoint path exposed by the emulator.
const HEALTH_PATH: &str = "/_localstack/health";
/// Services the scenarios depend on.
const REQUIRED_SERVICES: &[&str] = &["s3", "cloudfront"];

/// Polls the emulator health endpoint until required services are up or timeout expires.
pub async fn wait_for_emulator_ready(endpoint: &str, timeout: Duration) -> Result<(), String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|err| format!("failed to build health client: {err}"))?;
    let url = format!("{}{HEALTH_PATH}", endpoint.trim_end_matches('/'));
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let last_error = match check_health(&client, &url).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if start.elapsed() > timeout {
            return Err(format!("emulator readiness timeout after {attempts} attempts: {last_error}"));
        }
        sleep(Duration::from_millis(250)).await;
    }
}

async fn check_health(client: &reqwest::Client, url: &str) -> Result<(), String> {
    let response = client.get(url).send().await.map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("health status {}", response.status()));
    }
    let body: Value = response.json().await.map_err(|err| err.to_string())?;
    for service in REQUIRED_SERVICES {
        let state = body.pointer(&format!("/services/{service}")).and_then(Value::as_str);
        if !matches!(state, Some("available" | "running")) {
            return Err(format!("service {service} not ready: {state:?}"));
        }
    }
    Ok(())
}
