// crates/sitestack-harness/src/options.rs
// ============================================================================
// Module: Provisioning Options
// Description: Per-scenario configuration consumed by the provisioning driver.
// Purpose: Carry working directory, variables, and env overrides by value.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`OptionsBuilder`] produces an immutable [`ProvisioningOptions`] for one
//! scenario. Environment overrides (emulator endpoint, placeholder
//! credentials, region) are explicit fields applied only to the child process
//! the driver spawns; the builder never touches the process environment.
//! Invariants:
//! - Options are immutable once built.
//! - Colorless output is enabled unless explicitly turned off.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::retry::RetryPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable redirecting all cloud API calls to an endpoint.
pub const ENDPOINT_ENV: &str = "AWS_ENDPOINT_URL";
/// Placeholder access key accepted by local emulators.
pub const PLACEHOLDER_ACCESS_KEY: &str = "test";
/// Placeholder secret key accepted by local emulators.
pub const PLACEHOLDER_SECRET_KEY: &str = "test";
/// Default region for emulator scenarios.
pub const DEFAULT_REGION: &str = "us-east-1";

// ============================================================================
// SECTION: Variable Values
// ============================================================================

/// Typed input variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// String variable.
    String(String),
    /// Boolean variable.
    Bool(bool),
    /// Numeric variable.
    Number(f64),
    /// List variable.
    List(Vec<VarValue>),
    /// Map variable.
    Map(BTreeMap<String, VarValue>),
}

impl VarValue {
    /// Renders the value for a `-var name=value` argument.
    ///
    /// Top-level strings are passed raw; everything else uses HCL literal syntax.
    #[must_use]
    pub fn to_arg(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            other => other.to_hcl(),
        }
    }

    /// Renders the value as an HCL literal.
    fn to_hcl(&self) -> String {
        match self {
            Self::String(value) => quote(value),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::List(values) => {
                let items: Vec<String> = values.iter().map(Self::to_hcl).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Map(values) => {
                let items: Vec<String> = values
                    .iter()
                    .map(|(key, value)| format!("{} = {}", quote(key), value.to_hcl()))
                    .collect();
                format!("{{{}}}", items.join(", "))
            }
        }
    }
}

/// Renders `text` as a double-quoted HCL string literal.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Immutable provisioning configuration for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningOptions {
    /// Configuration directory the tool runs in.
    working_dir: PathBuf,
    /// Input variables.
    vars: BTreeMap<String, VarValue>,
    /// Environment passed to the tool process only.
    env: BTreeMap<String, String>,
    /// Suppress colored output.
    no_color: bool,
    /// Saved plan location.
    plan_path: Option<PathBuf>,
    /// State file location.
    state_path: Option<PathBuf>,
    /// Tool data directory for providers and modules.
    data_dir: Option<PathBuf>,
    /// Transient failure retry policy.
    retry: RetryPolicy,
}

impl ProvisioningOptions {
    /// Returns the configuration directory.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Returns the input variables.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, VarValue> {
        &self.vars
    }

    /// Returns the child-process environment overrides.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Returns true when colorless output is requested.
    #[must_use]
    pub const fn no_color(&self) -> bool {
        self.no_color
    }

    /// Returns the plan artifact path when set.
    #[must_use]
    pub fn plan_path(&self) -> Option<&Path> {
        self.plan_path.as_deref()
    }

    /// Returns the state file path when set.
    #[must_use]
    pub fn state_path(&self) -> Option<&Path> {
        self.state_path.as_deref()
    }

    /// Returns the tool data directory when set.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Returns the transient error retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns the configured emulator endpoint override.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.env.get(ENDPOINT_ENV).map(String::as_str)
    }

    /// Renders `-var` arguments in sorted variable order.
    #[must_use]
    pub fn var_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .flat_map(|(name, value)| ["-var".to_string(), format!("{name}={}", value.to_arg())])
            .collect()
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`ProvisioningOptions`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    /// Configuration directory.
    working_dir: PathBuf,
    /// Input variables.
    vars: BTreeMap<String, VarValue>,
    /// Explicit environment overrides.
    env: BTreeMap<String, String>,
    /// Emulator endpoint URL.
    endpoint: Option<String>,
    /// Region for the provider.
    region: String,
    /// Suppress colored output.
    no_color: bool,
    /// Saved plan location.
    plan_path: Option<PathBuf>,
    /// State file location.
    state_path: Option<PathBuf>,
    /// Tool data directory.
    data_dir: Option<PathBuf>,
    /// Retry policy.
    retry: RetryPolicy,
}

impl OptionsBuilder {
    /// Starts a builder for the configuration directory.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            vars: BTreeMap::new(),
            env: BTreeMap::new(),
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            no_color: true,
            plan_path: None,
            state_path: None,
            data_dir: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets an input variable.
    #[must_use]
    pub fn var(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Sets the emulator endpoint override.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the cloud region.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Adds an extra child-process environment variable.
    #[must_use]
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Toggles colorless output.
    #[must_use]
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Sets the plan artifact path.
    #[must_use]
    pub fn plan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plan_path = Some(path.into());
        self
    }

    /// Sets the state file path.
    #[must_use]
    pub fn state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    /// Sets the tool data directory (`TF_DATA_DIR`).
    #[must_use]
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the immutable options.
    #[must_use]
    pub fn build(self) -> ProvisioningOptions {
        let mut env = BTreeMap::new();
        env.insert("AWS_ACCESS_KEY_ID".to_string(), PLACEHOLDER_ACCESS_KEY.to_string());
        env.insert("AWS_SECRET_ACCESS_KEY".to_string(), PLACEHOLDER_SECRET_KEY.to_string());
        env.insert("AWS_DEFAULT_REGION".to_string(), self.region.clone());
        env.insert("AWS_REGION".to_string(), self.region);
        env.insert("TF_IN_AUTOMATION".to_string(), "1".to_string());
        if let Some(endpoint) = self.endpoint {
            env.insert(ENDPOINT_ENV.to_string(), endpoint);
        }
        if let Some(data_dir) = &self.data_dir {
            env.insert("TF_DATA_DIR".to_string(), data_dir.display().to_string());
        }
        env.extend(self.env);
        ProvisioningOptions {
            working_dir: self.working_dir,
            vars: self.vars,
            env,
            no_color: self.no_color,
            plan_path: self.plan_path,
            state_path: self.state_path,
            data_dir: self.data_dir,
            retry: self.retry,
        }
    }
}
