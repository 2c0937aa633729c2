// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, sitestack-harness, serde, serde_jcs
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use sitestack_harness::ScenarioReport;
use sitestack_harness::VerificationReport;
use system_tests::config::SystemTestConfig;

#[derive(Debug, Default, Clone, Copy, Serialize)]
struct CheckCounts {
    passed: usize,
    failed: usize,
    skipped: usize,
}

#[derive(Debug, Serialize)]
struct TestSummary {
    test_name: String,
    status: String,
    started_at_ms: u128,
    ended_at_ms: u128,
    duration_ms: u128,
    checks: CheckCounts,
    notes: Vec<String>,
    artifacts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScenarioRecord<'a> {
    name: &'a str,
    final_state: sitestack_harness::ScenarioState,
    history: &'a [sitestack_harness::ScenarioState],
    lifecycle_error: Option<String>,
    verify_error: Option<String>,
    panic: Option<&'a str>,
    teardown_error: Option<String>,
    checks: &'a VerificationReport,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
}

/// Artifact manager for a single system-test.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(test_name: &str, config: &SystemTestConfig) -> io::Result<Self> {
        let root = config
            .run_root
            .as_ref()
            .map_or_else(|| default_run_root(test_name), |root| root.join(test_name));
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns a fresh working directory for one scenario's state and tool data.
    pub fn scenario_dir(&self, scenario: &str) -> io::Result<PathBuf> {
        let dir = self.root.join("scenarios").join(scenario);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

/// Helper that writes summaries even when a test panics.
pub struct TestReporter {
    artifacts: TestArtifacts,
    config: SystemTestConfig,
    test_name: String,
    started_at_ms: u128,
    checks: CheckCounts,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test, loading the run configuration.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        Ok(Self {
            artifacts: TestArtifacts::new(test_name, &config)?,
            config,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            checks: CheckCounts::default(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &SystemTestConfig {
        &self.config
    }

    /// Writes `<scenario>.json` and accumulates its check counts.
    pub fn record_scenario(&mut self, report: &ScenarioReport) -> io::Result<String> {
        let record = ScenarioRecord {
            name: &report.name,
            final_state: report.final_state,
            history: &report.history,
            lifecycle_error: report.lifecycle_error.as_ref().map(ToString::to_string),
            verify_error: report.verify_error.as_ref().map(ToString::to_string),
            panic: report.panic.as_deref(),
            teardown_error: report.teardown_error.as_ref().map(ToString::to_string),
            checks: &report.verification,
        };
        let name = format!("{}.json", report.name);
        self.artifacts.write_json(&name, &record)?;
        self.checks.passed += report.verification.passed();
        self.checks.failed += report.verification.failed();
        self.checks.skipped += report.verification.skipped();
        Ok(name)
    }

    /// Writes the final summary for the test.
    pub fn finish(
        &mut self,
        status: &str,
        notes: Vec<String>,
        artifacts: Vec<String>,
    ) -> io::Result<()> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            checks: self.checks,
            notes,
            artifacts,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "fail" };
        let _ = self.finish(
            status,
            vec!["test terminated without explicit summary".to_string()],
            Vec::new(),
        );
    }
}

fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# System-Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    let _ = writeln!(
        out,
        "- Checks: {} passed, {} failed, {} skipped",
        summary.checks.passed, summary.checks.failed, summary.checks.skipped
    );
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    } else {
        for note in &summary.notes {
            let _ = writeln!(out, "- {note}");
        }
    }
    out.push_str("\n## Artifacts\n\n");
    if summary.artifacts.is_empty() {
        out.push_str("- None\n");
    } else {
        for artifact in &summary.artifacts {
            let _ = writeln!(out, "- {artifact}");
        }
    }
    out
}
