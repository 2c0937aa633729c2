// system-tests/tests/suites/source_layout.rs
// ============================================================================
// Module: Module Source Layout Tests
// Description: Static checks over the aggregated configuration sources.
// Purpose: Ensure the module declares every part of the hosting stack.
// Dependencies: system-tests helpers, sitestack-harness
// ============================================================================

use helpers::artifacts::TestReporter;
use sitestack_harness::SourceTree;
use sitestack_harness::Verdict;
use sitestack_harness::VerificationReport;
use sitestack_harness::verify::check_true;

use crate::helpers;

/// Resource types the module must declare at least once.
const STACK_RESOURCES: &[&str] = &[
    "aws_s3_bucket",
    "aws_cloudfront_distribution",
    "aws_acm_certificate",
    "aws_route53_record",
];

#[tokio::test(flavor = "multi_thread")]
async fn module_sources_declare_stack() -> Result<(), Box<dyn std::error::Error>> {
    helpers::logging::init();
    let mut reporter = TestReporter::new("module_sources_declare_stack")?;
    let config = reporter.config().clone();
    let tree = SourceTree::load(&config.module_root())?;

    let mut checks = VerificationReport::new();
    checks.record(check_true("sources.non_empty", !tree.text().trim().is_empty(), "tf sources", "none"));
    for resource_type in STACK_RESOURCES {
        let count = tree.count_resource_type(resource_type);
        checks.record(check_true(
            format!("declares.{resource_type}"),
            count > 0,
            "at least one resource block",
            count,
        ));
    }
    checks.record(check_true(
        "declares.data.aws_route53_zone",
        tree.declares_data_type("aws_route53_zone"),
        "a data block",
        "none",
    ));
    let artifact = reporter.artifacts().write_json("source_layout.json", &checks)?;

    if checks.verdict(config.skip_policy()) != Verdict::Pass {
        return Err(checks.describe_failures(config.skip_policy()).into());
    }
    reporter.finish(
        "pass",
        vec![format!("{} checks over the module sources", checks.results().len())],
        vec![artifact.display().to_string()],
    )?;
    Ok(())
}
