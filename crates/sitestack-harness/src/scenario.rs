// crates/sitestack-harness/src/scenario.rs
// ============================================================================
// Module: Scenario Lifecycle
// Description: Provision, verify, and tear down one isolated scenario.
// Purpose: Guarantee teardown and capture every outcome in one report.
// Dependencies: tokio, tracing, serde
// ============================================================================

//! ## Overview
//! A [`Scenario`] owns one options instance and walks the lifecycle
//! `Init -> Planned | Applied -> Verified -> TornDown`. Verification runs on a
//! spawned task so a panicking assertion is captured instead of skipping
//! teardown. `destroy` runs exactly once per executed scenario, whatever the
//! earlier steps produced.
//! Checks recorded through [`ScenarioContext::record`] survive a verification
//! that later errors, panics, or times out.
//! Invariants:
//! - [`Scenario::execute`] consumes the scenario, so it cannot run twice.
//! - Teardown failures are reported but never change the verification verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use serde::Serialize;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::driver::ProvisioningDriver;
use crate::emulator::EmulatorSession;
use crate::error::HarnessError;
use crate::options::ProvisioningOptions;
use crate::outputs::OutputSet;
use crate::plan::PlanResult;
use crate::verify::CheckResult;
use crate::verify::SkipPolicy;
use crate::verify::Verdict;
use crate::verify::VerificationReport;

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// How far a scenario provisions before verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleMode {
    /// `init` then `plan_and_show`; nothing is created.
    PlanOnly,
    /// `init` then `apply`; resources exist during verification.
    Apply,
}

impl LifecycleMode {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlanOnly => "plan_only",
            Self::Apply => "apply",
        }
    }
}

/// Scenario lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Options built, nothing run yet.
    Init,
    /// A plan was computed.
    Planned,
    /// Resources were applied.
    Applied,
    /// Verification completed.
    Verified,
    /// Teardown ran.
    TornDown,
}

impl ScenarioState {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Planned => "planned",
            Self::Applied => "applied",
            Self::Verified => "verified",
            Self::TornDown => "torn_down",
        }
    }

    /// Returns true when `next` is reachable from this state in one step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Planned | Self::Applied)
                | (Self::Planned | Self::Applied, Self::Verified)
                | (Self::Init | Self::Planned | Self::Applied | Self::Verified, Self::TornDown)
        )
    }

    /// Returns `next` when the transition is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidTransition`] otherwise.
    pub fn transition(self, next: Self) -> Result<Self, HarnessError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarnessError::InvalidTransition {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

// ============================================================================
// SECTION: Scenario Context
// ============================================================================

/// Everything a verification closure may inspect.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Scenario name.
    name: String,
    /// Options the scenario provisioned with.
    options: ProvisioningOptions,
    /// Plan from a plan-only run.
    plan: Option<PlanResult>,
    /// Outputs from an applied run.
    outputs: Option<OutputSet>,
    /// Emulator session for direct queries.
    emulator: Option<EmulatorSession>,
    /// Checks recorded so far; shared by every clone of the context.
    checks: Arc<Mutex<VerificationReport>>,
}

impl ScenarioContext {
    /// Returns the scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scenario options.
    #[must_use]
    pub const fn options(&self) -> &ProvisioningOptions {
        &self.options
    }

    /// Returns the plan of a plan-only scenario.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when the scenario was applied.
    pub fn plan(&self) -> Result<&PlanResult, HarnessError> {
        self.plan.as_ref().ok_or_else(|| {
            HarnessError::Configuration(format!("scenario {} has no plan", self.name))
        })
    }

    /// Returns the outputs of an applied scenario.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when the scenario was only planned.
    pub fn outputs(&self) -> Result<&OutputSet, HarnessError> {
        self.outputs.as_ref().ok_or_else(|| {
            HarnessError::Configuration(format!("scenario {} has no outputs", self.name))
        })
    }

    /// Returns the emulator session attached to the scenario.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when none was attached.
    pub fn emulator(&self) -> Result<&EmulatorSession, HarnessError> {
        self.emulator.as_ref().ok_or_else(|| {
            HarnessError::Configuration(format!("scenario {} has no emulator session", self.name))
        })
    }

    /// Records a sub-check into the scenario report.
    pub fn record(&self, result: CheckResult) {
        self.checks.lock().unwrap_or_else(PoisonError::into_inner).record(result);
    }
}

/// Takes every check recorded through a context.
fn take_recorded(checks: &Mutex<VerificationReport>) -> VerificationReport {
    std::mem::take(&mut *checks.lock().unwrap_or_else(PoisonError::into_inner))
}

// ============================================================================
// SECTION: Scenario Report
// ============================================================================

/// Outcome of one executed scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// State after teardown.
    pub final_state: ScenarioState,
    /// Every state visited, starting with [`ScenarioState::Init`].
    pub history: Vec<ScenarioState>,
    /// Provisioning failure before verification, if any.
    pub lifecycle_error: Option<HarnessError>,
    /// Error returned by the verification closure, if any.
    pub verify_error: Option<HarnessError>,
    /// Recorded sub-check results.
    pub verification: VerificationReport,
    /// Panic message from the verification task, if it panicked.
    pub panic: Option<String>,
    /// Teardown failure, if any.
    pub teardown_error: Option<HarnessError>,
}

impl ScenarioReport {
    /// Creates an empty report in the initial state.
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            final_state: ScenarioState::Init,
            history: vec![ScenarioState::Init],
            lifecycle_error: None,
            verify_error: None,
            verification: VerificationReport::new(),
            panic: None,
            teardown_error: None,
        }
    }

    /// Returns the overall verdict under a skip policy.
    #[must_use]
    pub fn verdict(&self, policy: SkipPolicy) -> Verdict {
        if self.lifecycle_error.is_some() || self.verify_error.is_some() || self.panic.is_some() {
            return Verdict::Fail;
        }
        self.verification.verdict(policy)
    }

    /// Converts the report into a test result.
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error, verification error, or panic when present,
    /// else [`HarnessError::Assertion`] when the verdict fails.
    pub fn into_result(self, policy: SkipPolicy) -> Result<VerificationReport, HarnessError> {
        if let Some(err) = &self.teardown_error {
            warn!(scenario = %self.name, error = %err, "teardown failed");
        }
        if let Some(err) = self.lifecycle_error {
            return Err(err);
        }
        if let Some(err) = self.verify_error {
            return Err(err);
        }
        if let Some(message) = self.panic {
            return Err(HarnessError::VerificationPanicked(message));
        }
        match self.verification.verdict(policy) {
            Verdict::Pass => Ok(self.verification),
            Verdict::Fail => Err(HarnessError::Assertion {
                check: self.name,
                expected: "all checks pass".to_string(),
                actual: self.verification.describe_failures(policy),
            }),
        }
    }
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// One isolated provisioning scenario.
pub struct Scenario {
    /// Scenario name.
    name: String,
    /// Provisioning driver.
    driver: Arc<dyn ProvisioningDriver>,
    /// Per-scenario options.
    options: ProvisioningOptions,
    /// Optional emulator session handed to verification.
    emulator: Option<EmulatorSession>,
    /// Deadline for each provisioning and verification step.
    step_timeout: Option<Duration>,
    /// Current lifecycle state.
    state: ScenarioState,
    /// States visited so far.
    history: Vec<ScenarioState>,
}

impl Scenario {
    /// Creates a scenario in [`ScenarioState::Init`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        driver: Arc<dyn ProvisioningDriver>,
        options: ProvisioningOptions,
    ) -> Self {
        Self {
            name: name.into(),
            driver,
            options,
            emulator: None,
            step_timeout: None,
            state: ScenarioState::Init,
            history: vec![ScenarioState::Init],
        }
    }

    /// Attaches an emulator session for direct resource queries.
    #[must_use]
    pub fn with_emulator(mut self, session: EmulatorSession) -> Self {
        self.emulator = Some(session);
        self
    }

    /// Bounds each provisioning and verification step. Teardown is unbounded.
    #[must_use]
    pub const fn with_step_timeout(mut self, limit: Duration) -> Self {
        self.step_timeout = Some(limit);
        self
    }

    /// Returns the scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ScenarioState {
        self.state
    }

    /// Runs provisioning, verification, and teardown.
    pub async fn execute<F, Fut>(mut self, mode: LifecycleMode, verify: F) -> ScenarioReport
    where
        F: FnOnce(ScenarioContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<VerificationReport, HarnessError>> + Send + 'static,
    {
        info!(scenario = %self.name, mode = mode.as_str(), "scenario starting");
        let mut report = ScenarioReport::new(&self.name);
        match self.provision(mode).await {
            Ok(context) => self.run_verification(context, verify, &mut report).await,
            Err(err) => {
                error!(scenario = %self.name, error = %err, "provisioning failed");
                report.lifecycle_error = Some(err);
            }
        }
        self.teardown(&mut report).await;
        report.final_state = self.state;
        report.history = self.history;
        info!(
            scenario = %report.name,
            passed = report.verification.passed(),
            failed = report.verification.failed(),
            skipped = report.verification.skipped(),
            "scenario finished"
        );
        report
    }

    /// Moves to `next`, recording it in the history.
    fn advance(&mut self, next: ScenarioState) -> Result<(), HarnessError> {
        self.state = self.state.transition(next)?;
        self.history.push(next);
        Ok(())
    }

    /// Runs `init` and then plan or apply.
    async fn provision(&mut self, mode: LifecycleMode) -> Result<ScenarioContext, HarnessError> {
        let mut context = ScenarioContext {
            name: self.name.clone(),
            options: self.options.clone(),
            plan: None,
            outputs: None,
            emulator: self.emulator.clone(),
            checks: Arc::new(Mutex::new(VerificationReport::new())),
        };
        bounded(self.step_timeout, "init", self.driver.init(&self.options)).await?;
        match mode {
            LifecycleMode::PlanOnly => {
                let plan =
                    bounded(self.step_timeout, "plan", self.driver.plan_and_show(&self.options))
                        .await?;
                self.advance(ScenarioState::Planned)?;
                context.plan = Some(plan);
            }
            LifecycleMode::Apply => {
                let outputs =
                    bounded(self.step_timeout, "apply", self.driver.apply(&self.options)).await?;
                self.advance(ScenarioState::Applied)?;
                context.outputs = Some(outputs);
            }
        }
        Ok(context)
    }

    /// Runs the verification closure on its own task.
    ///
    /// Checks recorded through the context come first, followed by any
    /// returned report; they are kept on every outcome.
    async fn run_verification<F, Fut>(
        &mut self,
        context: ScenarioContext,
        verify: F,
        report: &mut ScenarioReport,
    ) where
        F: FnOnce(ScenarioContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<VerificationReport, HarnessError>> + Send + 'static,
    {
        let recorded = Arc::clone(&context.checks);
        let mut handle = tokio::spawn(verify(context));
        let joined = match self.step_timeout {
            Some(limit) => {
                if let Ok(joined) = tokio::time::timeout(limit, &mut handle).await {
                    joined
                } else {
                    handle.abort();
                    report.verification = take_recorded(&recorded);
                    report.verify_error = Some(HarnessError::Timeout {
                        operation: "verify",
                        seconds: limit.as_secs(),
                    });
                    return;
                }
            }
            None => handle.await,
        };
        report.verification = take_recorded(&recorded);
        match joined {
            Ok(Ok(verification)) => {
                report.verification.merge(verification);
                if let Err(err) = self.advance(ScenarioState::Verified) {
                    report.lifecycle_error = Some(err);
                }
            }
            Ok(Err(err)) => {
                warn!(scenario = %self.name, error = %err, "verification aborted");
                report.verify_error = Some(err);
            }
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                error!(scenario = %self.name, panic = %message, "verification panicked");
                report.panic = Some(message);
            }
            Err(join_err) => report.panic = Some(join_err.to_string()),
        }
    }

    /// Destroys the scenario's resources exactly once.
    async fn teardown(&mut self, report: &mut ScenarioReport) {
        info!(scenario = %self.name, state = self.state.as_str(), "tearing down");
        if let Err(err) = self.driver.destroy(&self.options).await {
            warn!(scenario = %self.name, error = %err, "destroy failed");
            report.teardown_error = Some(err);
        }
        if let Err(err) = self.advance(ScenarioState::TornDown) {
            if report.lifecycle_error.is_none() {
                report.lifecycle_error = Some(err);
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Awaits a step, failing with [`HarnessError::Timeout`] past the limit.
async fn bounded<T, Fut>(
    limit: Option<Duration>,
    operation: &'static str,
    step: Fut,
) -> Result<T, HarnessError>
where
    Fut: Future<Output = Result<T, HarnessError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, step).await.map_err(|_| HarnessError::Timeout {
            operation,
            seconds: limit.as_secs(),
        })?,
        None => step.await,
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod scenario_tests;
