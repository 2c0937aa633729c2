// crates/sitestack-harness/src/driver/terraform.rs
// ============================================================================
// Module: Terraform CLI Driver
// Description: Provisioning driver backed by the terraform command line tool.
// Purpose: Run lifecycle commands with per-scenario env, state, and retries.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`TerraformCli`] runs the tool through `tokio::process::Command` in the
//! scenario's working directory. The options' environment overrides are
//! applied to the child only. Every invocation goes through the options'
//! retry policy; failures keep the diagnostic tail for reports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ProvisioningDriver;
use crate::error::DriverFailure;
use crate::error::HarnessError;
use crate::options::ProvisioningOptions;
use crate::outputs::OutputSet;
use crate::plan::PlanResult;
use crate::retry::run_with_retry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default tool binary resolved through `PATH`.
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";
/// Default plan artifact name when the options carry none.
const DEFAULT_PLAN_FILE: &str = "sitestack.tfplan";
/// Maximum diagnostic bytes kept in a failure record.
const MAX_DETAIL_BYTES: usize = 4 * 1024;
/// Output markers that mean destroy found nothing left to remove.
const ALREADY_DESTROYED_MARKERS: &[&str] =
    &["NoSuchBucket", "NoSuchDistribution", "NoSuchHostedZone", "ResourceNotFoundException"];

// ============================================================================
// SECTION: Invocation Failure
// ============================================================================

/// Failure of a single tool invocation before lifecycle classification.
#[derive(Debug)]
enum RunFailure {
    /// The process could not be started.
    Spawn(String),
    /// The process exited unsuccessfully.
    Exit {
        /// Exit code, absent when killed by a signal.
        code: Option<i32>,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
}

impl RunFailure {
    /// Returns the combined diagnostic text.
    fn text(&self) -> String {
        match self {
            Self::Spawn(message) => message.clone(),
            Self::Exit {
                stdout,
                stderr,
                ..
            } => format!("{stdout}\n{stderr}"),
        }
    }
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Terraform command line driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformCli {
    /// Path or name of the `terraform` executable.
    binary: PathBuf,
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new(DEFAULT_TERRAFORM_BINARY)
    }
}

impl TerraformCli {
    /// Builds a driver for the given binary path or name.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Returns the tool binary.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Returns the plan artifact path for the options.
    #[must_use]
    pub fn plan_file(options: &ProvisioningOptions) -> PathBuf {
        options.plan_path().map_or_else(
            || {
                options
                    .data_dir()
                    .unwrap_or_else(|| options.working_dir())
                    .join(DEFAULT_PLAN_FILE)
            },
            Path::to_path_buf,
        )
    }

    /// Builds the argument list for an operation.
    #[must_use]
    pub fn command_args(
        operation: &'static str,
        options: &ProvisioningOptions,
        extra: &[String],
    ) -> Vec<String> {
        let mut args = vec![operation.to_string()];
        match operation {
            "init" => {
                args.push("-input=false".to_string());
                args.push("-upgrade=false".to_string());
            }
            "plan" | "apply" | "destroy" => {
                args.push("-input=false".to_string());
                args.push("-lock=false".to_string());
                if operation != "plan" {
                    args.push("-auto-approve".to_string());
                }
                push_state(&mut args, options);
                args.extend(options.var_args());
            }
            "output" => {
                args.push("-json".to_string());
                push_state(&mut args, options);
            }
            _ => {}
        }
        if options.no_color() {
            args.push("-no-color".to_string());
        }
        args.extend(extra.iter().cloned());
        args
    }

    /// Runs one invocation and returns stdout on success.
    async fn run_once(
        &self,
        operation: &'static str,
        options: &ProvisioningOptions,
        args: &[String],
    ) -> Result<String, RunFailure> {
        let started = Instant::now();
        info!(
            operation,
            dir = %options.working_dir().display(),
            binary = %self.binary.display(),
            "running provisioning tool"
        );
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(options.working_dir())
            .envs(options.env())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| RunFailure::Spawn(err.to_string()))?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            debug!(operation, elapsed_ms, "provisioning tool succeeded");
            return Ok(stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        warn!(operation, elapsed_ms, code = ?output.status.code(), "provisioning tool failed");
        Err(RunFailure::Exit {
            code: output.status.code(),
            stdout,
            stderr,
        })
    }

    /// Runs an operation under the options' retry policy.
    async fn run(
        &self,
        operation: &'static str,
        options: &ProvisioningOptions,
        extra: &[String],
        classify: fn(DriverFailure) -> HarnessError,
    ) -> Result<String, HarnessError> {
        let args = Self::command_args(operation, options, extra);
        run_with_retry(options.retry(), operation, RunFailure::text, || {
            self.run_once(operation, options, &args)
        })
        .await
        .map_err(|failure| self.classify_failure(operation, options, failure, classify))
    }

    /// Maps a run failure onto the operation's error variant.
    fn classify_failure(
        &self,
        operation: &'static str,
        options: &ProvisioningOptions,
        failure: RunFailure,
        classify: fn(DriverFailure) -> HarnessError,
    ) -> HarnessError {
        match failure {
            RunFailure::Spawn(message) => HarnessError::Spawn {
                program: self.binary.display().to_string(),
                message,
            },
            RunFailure::Exit {
                code,
                stdout,
                stderr,
            } => {
                let source = if stderr.trim().is_empty() { stdout } else { stderr };
                classify(DriverFailure {
                    operation,
                    directory: options.working_dir().to_path_buf(),
                    exit_code: code,
                    detail: tail(source.trim(), MAX_DETAIL_BYTES).to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl ProvisioningDriver for TerraformCli {
    async fn init(&self, options: &ProvisioningOptions) -> Result<(), HarnessError> {
        self.run("init", options, &[], HarnessError::Init).await.map(|_| ())
    }

    async fn plan_and_show(
        &self,
        options: &ProvisioningOptions,
    ) -> Result<PlanResult, HarnessError> {
        let plan_file = Self::plan_file(options);
        let out = format!("-out={}", plan_file.display());
        self.run("plan", options, &[out], HarnessError::Plan).await?;
        let show_args = vec!["-json".to_string(), plan_file.display().to_string()];
        let raw = self.run("show", options, &show_args, HarnessError::Plan).await?;
        let plan = PlanResult::from_json_str(&raw)?;
        info!(resources = plan.resource_count(), plan = %plan_file.display(), "plan decoded");
        Ok(plan)
    }

    async fn apply(&self, options: &ProvisioningOptions) -> Result<OutputSet, HarnessError> {
        self.run("apply", options, &[], HarnessError::Apply).await?;
        self.outputs(options).await
    }

    async fn outputs(&self, options: &ProvisioningOptions) -> Result<OutputSet, HarnessError> {
        let raw = self.run("output", options, &[], HarnessError::Output).await?;
        OutputSet::from_json_str(&raw)
    }

    async fn destroy(&self, options: &ProvisioningOptions) -> Result<(), HarnessError> {
        match self.run("destroy", options, &[], HarnessError::Destroy).await {
            Ok(_) => Ok(()),
            Err(HarnessError::Destroy(failure)) if is_already_destroyed(&failure.detail) => {
                info!(dir = %failure.directory.display(), "destroy found resources already removed");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn validate(&self, options: &ProvisioningOptions) -> Result<(), HarnessError> {
        self.run("validate", options, &[], HarnessError::Validation).await.map(|_| ())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends `-state=` when the options pin a state file.
fn push_state(args: &mut Vec<String>, options: &ProvisioningOptions) {
    if let Some(state) = options.state_path() {
        args.push(format!("-state={}", state.display()));
    }
}

/// Returns true when destroy output only reports already-removed resources.
fn is_already_destroyed(detail: &str) -> bool {
    ALREADY_DESTROYED_MARKERS.iter().any(|marker| detail.contains(marker))
}

/// Returns at most the last `max_bytes` of `text`, cut on a char boundary.
fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
