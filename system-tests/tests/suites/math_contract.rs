// system-tests/tests/suites/math_contract.rs
// ============================================================================
// Module: Math Contract Tests
// Description: End-to-end math suite and typed client checks.
// Purpose: Validate the expression evaluator contracts over HTTP.
// Dependencies: system-tests helpers, contract-probe-services
// ============================================================================

//! ## Overview
//! Runs the built-in math suite against the configured target and checks the
//! typed client sees the same single and batch answers.

use contract_probe_services::BatchOutcome;
use contract_probe_services::BatchRequest;
use contract_probe_services::MathClient;
use contract_probe_services::math::INVALID_BATCH;
use contract_probe_services::math::MISSING_PARENTHESIS;
use contract_probe_services::math::UNEXPECTED_END;
use contract_probe_services::math::VALID_BATCH;
use contract_probe_services::math_suite;
use helpers::artifacts::TestReporter;
use helpers::targets::math_target;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn math_suite_passes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("math_suite_passes")?;
    let target = math_target()?;
    let suite = math_suite();

    let report = target.runner()?.run(&suite).await?;
    reporter.artifacts().write_suite_report(&report)?;

    assert!(report.passed(), "{}", report.render_text());
    assert_eq!(report.counts.cases_passed, suite.cases.len());
    assert_eq!(report.counts.scenarios_passed, 5);
    assert_eq!(report.counts.scenarios_skipped, 0);

    reporter.finish(
        "pass",
        vec![format!("math suite passed against {}", target.base_url())],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "reports/math.json".to_string(),
            "reports/math.md".to_string(),
        ],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn math_client_evaluates_expressions() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("math_client_evaluates_expressions")?;
    let target = math_target()?;
    let client = MathClient::new(target.service_client()?);

    assert_eq!(client.evaluate("2*(7-3)", None).await?, "8");
    let missing = client.evaluate("2*(7-3", None).await?;
    assert!(missing.contains(MISSING_PARENTHESIS), "{missing}");
    let trailing = client.evaluate("2*(7-", None).await?;
    assert!(trailing.contains(UNEXPECTED_END), "{trailing}");

    reporter.finish(
        "pass",
        vec!["single expressions answered with text".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn math_client_evaluates_batches() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("math_client_evaluates_batches")?;
    let target = math_target()?;
    let client = MathClient::new(target.service_client()?);

    let valid = client.evaluate_batch(&BatchRequest::new(&VALID_BATCH, Some(14))).await?;
    reporter.artifacts().write_json("valid_batch.json", &valid)?;
    let result = match valid {
        BatchOutcome::Evaluated {
            result,
        } => result,
        BatchOutcome::Rejected {
            error,
        } => return Err(format!("valid batch rejected: {error}").into()),
    };
    assert_eq!(result.len(), VALID_BATCH.len());
    assert_eq!(result[0].len(), 16, "{}", result[0]);

    let invalid = client.evaluate_batch(&BatchRequest::new(&INVALID_BATCH, Some(6))).await?;
    reporter.artifacts().write_json("invalid_batch.json", &invalid)?;
    let error = match invalid {
        BatchOutcome::Rejected {
            error,
        } => error,
        BatchOutcome::Evaluated {
            result,
        } => return Err(format!("invalid batch evaluated: {}", result.join(", ")).into()),
    };
    assert!(error.contains(MISSING_PARENTHESIS), "{error}");

    reporter.finish(
        "pass",
        vec!["batch results and batch errors decoded".to_string()],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "valid_batch.json".to_string(),
            "invalid_batch.json".to_string(),
        ],
    )?;
    Ok(())
}
