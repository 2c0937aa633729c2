// system-tests/tests/suites/static_website.rs
// ============================================================================
// Module: Static Website Lifecycle Tests
// Description: Apply the example configurations against the emulator.
// Purpose: Verify outputs and provisioned resources, then tear down.
// Dependencies: system-tests helpers, sitestack-harness
// ============================================================================

use std::sync::Arc;

use helpers::artifacts::TestReporter;
use helpers::infra::EmulatorFixture;
use helpers::scenarios::SiteFixture;
use helpers::timeouts::APPLY_STEP;
use helpers::timeouts::resolve_timeout;
use sitestack_harness::CheckOutcome;
use sitestack_harness::HarnessError;
use sitestack_harness::LifecycleMode;
use sitestack_harness::OutputSet;
use sitestack_harness::ProvisioningDriver;
use sitestack_harness::Scenario;
use sitestack_harness::ScenarioContext;
use sitestack_harness::VerificationReport;
use sitestack_harness::verify::check_output_eq;
use sitestack_harness::verify::check_output_non_empty;
use sitestack_harness::verify::from_query;
use sitestack_harness::verify::outcome_eq;

use crate::helpers;

const CDN_OUTPUT: &str = "website_cdn_root_id";
const ROOT_OUTPUT: &str = "website_root_s3_bucket";
const LOGS_OUTPUT: &str = "website_logs_s3_bucket";
const REDIRECT_OUTPUT: &str = "website_redirect_s3_bucket";

#[tokio::test(flavor = "multi_thread")]
async fn static_website_basic() -> Result<(), Box<dyn std::error::Error>> {
    helpers::logging::init();
    let mut reporter = TestReporter::new("static_website_basic")?;
    let site = SiteFixture::BASIC;
    let artifact = run_applied(&mut reporter, site, "basic", verify_basic).await?;
    reporter.finish(
        "pass",
        vec!["basic site applied, verified, and destroyed".to_string()],
        vec![artifact],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn static_website_spa() -> Result<(), Box<dyn std::error::Error>> {
    helpers::logging::init();
    let mut reporter = TestReporter::new("static_website_spa")?;
    let site = SiteFixture::SPA;
    let artifact = run_applied(&mut reporter, site, "spa", verify_spa).await?;
    reporter.finish(
        "pass",
        vec!["spa site applied, verified, and destroyed".to_string()],
        vec![artifact],
    )?;
    Ok(())
}

/// Applies `site` in its own emulator and working directory, returning the scenario artifact.
async fn run_applied<F, Fut>(
    reporter: &mut TestReporter,
    site: SiteFixture,
    name: &str,
    verify: F,
) -> Result<String, Box<dyn std::error::Error>>
where
    F: FnOnce(ScenarioContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<VerificationReport, HarnessError>> + Send + 'static,
{
    let config = reporter.config().clone();
    let fixture = EmulatorFixture::start(&config).await?;
    fixture.seed_zone(site.zone_root).await?;
    let work_dir = reporter.artifacts().scenario_dir(name)?;
    let options = site.options(&config, Some(fixture.endpoint()), &work_dir);
    let driver: Arc<dyn ProvisioningDriver> = Arc::new(config.driver());
    let report = Scenario::new(name, driver, options)
        .with_emulator(fixture.session())
        .with_step_timeout(resolve_timeout(APPLY_STEP, &config))
        .execute(LifecycleMode::Apply, verify)
        .await;
    let artifact = reporter.record_scenario(&report)?;
    report.into_result(config.skip_policy())?;
    Ok(artifact)
}

/// Records the output name contract shared by both sites.
fn record_outputs(ctx: &ScenarioContext, outputs: &OutputSet, site: SiteFixture) {
    ctx.record(check_output_non_empty(outputs, CDN_OUTPUT));
    ctx.record(check_output_eq(outputs, ROOT_OUTPUT, &site.root_bucket()));
    for name in outputs.names() {
        ctx.record(check_output_non_empty(outputs, name));
    }
}

async fn verify_basic(ctx: ScenarioContext) -> Result<VerificationReport, HarnessError> {
    let site = SiteFixture::BASIC;
    let outputs = ctx.outputs()?;
    record_outputs(&ctx, outputs, site);

    let root = site.root_bucket();
    let logs = site.logs_bucket();
    let redirect = site.redirect_bucket();
    ctx.record(check_output_eq(outputs, LOGS_OUTPUT, &logs));
    ctx.record(check_output_eq(outputs, REDIRECT_OUTPUT, &redirect));

    let emulator = ctx.emulator()?;
    for bucket in [&root, &logs, &redirect] {
        let exists = emulator.bucket_exists(bucket).await;
        ctx.record(from_query(format!("bucket_exists.{bucket}"), exists, |found| {
            outcome_eq(&true, &found)
        }));
    }

    let versioning = emulator.bucket_versioning(&root).await;
    ctx.record(from_query("root_bucket.versioning", versioning, |state| {
        outcome_eq("Enabled", state.status.as_deref().unwrap_or("unset"))
    }));
    let encryption = emulator.bucket_encryption(&root).await;
    ctx.record(from_query("root_bucket.encryption", encryption, |rules| {
        if rules.algorithms.is_empty() {
            CheckOutcome::Failed {
                expected: "at least one default encryption rule".to_string(),
                actual: "none".to_string(),
            }
        } else {
            CheckOutcome::Passed
        }
    }));
    let access = emulator.public_access_block(&root).await;
    ctx.record(from_query("root_bucket.public_access_block", access, |block| {
        outcome_eq(&true, &block.fully_blocked())
    }));
    let logging = emulator.bucket_logging(&root).await;
    ctx.record(from_query("root_bucket.logging_target", logging, |state| {
        outcome_eq(logs.as_str(), state.target_bucket.as_deref().unwrap_or("unset"))
    }));
    let website = emulator.bucket_website(&redirect).await;
    ctx.record(from_query("redirect_bucket.redirect_host", website, |config| {
        outcome_eq(site.domain_main, config.redirect_host.as_deref().unwrap_or("unset"))
    }));

    // Without an id the missing output is already recorded as failed.
    if let Some(cdn_id) = outputs.get(CDN_OUTPUT) {
        let distribution = emulator.distribution(cdn_id).await;
        ctx.record(from_query("distribution.readable", distribution, |snapshot| {
            outcome_eq(cdn_id, snapshot.id.as_str())
        }));
    }
    Ok(VerificationReport::new())
}

async fn verify_spa(ctx: ScenarioContext) -> Result<VerificationReport, HarnessError> {
    let site = SiteFixture::SPA;
    record_outputs(&ctx, ctx.outputs()?, site);

    let root = site.root_bucket();
    let exists = ctx.emulator()?.bucket_exists(&root).await;
    ctx.record(from_query(format!("bucket_exists.{root}"), exists, |found| {
        outcome_eq(&true, &found)
    }));
    Ok(VerificationReport::new())
}
