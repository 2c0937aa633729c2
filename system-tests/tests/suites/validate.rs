// system-tests/tests/suites/validate.rs
// ============================================================================
// Module: Configuration Validation Tests
// Description: Run the tool's validator over each example configuration.
// Purpose: Catch configuration errors without touching the emulator.
// Dependencies: system-tests helpers, sitestack-harness
// ============================================================================

use helpers::artifacts::TestReporter;
use helpers::scenarios::SiteFixture;
use sitestack_harness::ProvisioningDriver;
use sitestack_harness::Verdict;
use sitestack_harness::VerificationReport;
use sitestack_harness::verify::CheckResult;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn validate_examples() -> Result<(), Box<dyn std::error::Error>> {
    helpers::logging::init();
    let mut reporter = TestReporter::new("validate_examples")?;
    let config = reporter.config().clone();
    let driver = config.driver();

    let mut checks = VerificationReport::new();
    for site in [SiteFixture::BASIC, SiteFixture::SPA] {
        let work_dir = reporter.artifacts().scenario_dir(&format!("validate_{}", site.example))?;
        let options = site.options(&config, None, &work_dir);
        let name = format!("validate.{}", site.example);
        let result = match driver.init_and_validate(&options).await {
            Ok(()) => CheckResult::passed(name),
            Err(err) => CheckResult::failed(name, "valid configuration", err.to_string()),
        };
        checks.record(result);
    }
    let artifact = reporter.artifacts().write_json("validate.json", &checks)?;

    if checks.verdict(config.skip_policy()) != Verdict::Pass {
        return Err(checks.describe_failures(config.skip_policy()).into());
    }
    reporter.finish(
        "pass",
        vec!["both example configurations validate".to_string()],
        vec![artifact.display().to_string()],
    )?;
    Ok(())
}
