// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: sitestack-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, and unknown literals fail
//! closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use sitestack_harness::SkipPolicy;
use sitestack_harness::TerraformCli;
use sitestack_harness::emulator::EmulatorEndpoint;
use sitestack_harness::options::DEFAULT_REGION;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override.
    RunRoot,
    /// Optional directory of the module under test.
    ModuleRoot,
    /// Optional emulator endpoint; when unset a container is started.
    Endpoint,
    /// Optional region override.
    Region,
    /// Optional provisioning tool binary override.
    TerraformBin,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Treat skipped checks as failures (`true`/`false` or `1`/`0`).
    StrictSkips,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "SITESTACK_SYSTEM_TEST_RUN_ROOT",
            Self::ModuleRoot => "SITESTACK_SYSTEM_TEST_MODULE_ROOT",
            Self::Endpoint => "SITESTACK_SYSTEM_TEST_ENDPOINT",
            Self::Region => "SITESTACK_SYSTEM_TEST_REGION",
            Self::TerraformBin => "SITESTACK_SYSTEM_TEST_TERRAFORM_BIN",
            Self::TimeoutSeconds => "SITESTACK_SYSTEM_TEST_TIMEOUT_SEC",
            Self::StrictSkips => "SITESTACK_SYSTEM_TEST_STRICT_SKIPS",
        }
    }

    /// Returns every key in declaration order.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::RunRoot,
            Self::ModuleRoot,
            Self::Endpoint,
            Self::Region,
            Self::TerraformBin,
            Self::TimeoutSeconds,
            Self::StrictSkips,
        ]
    }
}

/// Module root relative to this crate when no override is set.
///
/// The workspace lives in the module's `tests/` directory.
const DEFAULT_MODULE_ROOT: &str = "../..";

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional module root override.
    pub module_root: Option<PathBuf>,
    /// Optional emulator endpoint URL.
    pub endpoint: Option<String>,
    /// Optional region override.
    pub region: Option<String>,
    /// Optional provisioning tool binary.
    pub terraform_bin: Option<PathBuf>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Treat skipped checks as failures.
    pub strict_skips: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout, URL, or boolean).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let module_root =
            read_env_nonempty(SystemTestEnv::ModuleRoot.as_str())?.map(PathBuf::from);
        let endpoint = read_env_nonempty(SystemTestEnv::Endpoint.as_str())?;
        let region = read_env_nonempty(SystemTestEnv::Region.as_str())?;
        if let Some(url) = &endpoint {
            EmulatorEndpoint::new(url.clone())
                .with_region(region.clone().unwrap_or_else(|| DEFAULT_REGION.to_string()))
                .validate()
                .map_err(|err| format!("{}: {err}", SystemTestEnv::Endpoint.as_str()))?;
        }
        let terraform_bin =
            read_env_nonempty(SystemTestEnv::TerraformBin.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let strict_skips = parse_bool_env(
            SystemTestEnv::StrictSkips.as_str(),
            read_env_nonempty(SystemTestEnv::StrictSkips.as_str())?,
        )?;
        Ok(Self {
            run_root,
            module_root,
            endpoint,
            region,
            terraform_bin,
            timeout,
            strict_skips,
        })
    }

    /// Returns the module root, defaulting to the directory above the workspace.
    #[must_use]
    pub fn module_root(&self) -> PathBuf {
        self.module_root.clone().unwrap_or_else(|| {
            Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_MODULE_ROOT)
        })
    }

    /// Returns the directory of a named example configuration.
    #[must_use]
    pub fn example_dir(&self, name: &str) -> PathBuf {
        self.module_root().join("examples").join(name)
    }

    /// Returns the effective region.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Returns the provisioning driver for this run.
    #[must_use]
    pub fn driver(&self) -> TerraformCli {
        self.terraform_bin.as_ref().map_or_else(TerraformCli::default, TerraformCli::new)
    }

    /// Returns the skip policy for this run.
    #[must_use]
    pub const fn skip_policy(&self) -> SkipPolicy {
        if self.strict_skips { SkipPolicy::Fail } else { SkipPolicy::Tolerate }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable, defaulting to false when unset.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
