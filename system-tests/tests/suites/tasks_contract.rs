// system-tests/tests/suites/tasks_contract.rs
// ============================================================================
// Module: Tasks Contract Tests
// Description: End-to-end tasks suite and typed client lifecycle checks.
// Purpose: Validate the task lifecycle contracts over HTTP.
// Dependencies: system-tests helpers, contract-probe-services
// ============================================================================

//! ## Overview
//! Runs the built-in tasks suite against the configured target, then walks a
//! single task through its lifecycle with the typed client.
//! Invariants:
//! - Every test starts by clearing the task list.
//! - A task in `DONE` is never reopened.

use contract_probe_services::NewTask;
use contract_probe_services::TaskReply;
use contract_probe_services::TaskStatus;
use contract_probe_services::TasksClient;
use contract_probe_services::tasks::ALL_TASKS_DELETED;
use contract_probe_services::tasks::ARRAY_IS_EMPTY;
use contract_probe_services::tasks::CANT_FIND_TASK;
use contract_probe_services::tasks::DESCRIPTION;
use contract_probe_services::tasks::DONE_TASK_CANNOT_REOPEN;
use contract_probe_services::tasks::TASK_DELETED;
use contract_probe_services::tasks::TITLE_ONE;
use contract_probe_services::tasks::TITLE_TWO;
use contract_probe_services::tasks_suite;
use helpers::artifacts::TestReporter;
use helpers::targets::tasks_target;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn tasks_suite_passes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("tasks_suite_passes")?;
    let target = tasks_target()?;
    let suite = tasks_suite();

    let report = target.runner()?.run(&suite).await?;
    reporter.artifacts().write_suite_report(&report)?;

    assert!(report.passed(), "{}", report.render_text());
    assert_eq!(report.counts.cases_passed, suite.cases.len());
    assert_eq!(report.counts.scenarios_skipped, 0);
    assert!(report.cases.iter().all(|case| case.hook.error.is_none()));

    reporter.finish(
        "pass",
        vec![format!("tasks suite passed against {}", target.base_url())],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "reports/tasks.json".to_string(),
            "reports/tasks.md".to_string(),
        ],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tasks_client_walks_the_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("tasks_client_walks_the_lifecycle")?;
    let target = tasks_target()?;
    let client = TasksClient::new(target.service_client()?);

    assert_eq!(client.delete_all().await?, ALL_TASKS_DELETED);
    assert_eq!(client.list().await?, TaskReply::Message(ARRAY_IS_EMPTY.to_string()));

    let first = client.create(&NewTask::new(TITLE_ONE, DESCRIPTION)).await?;
    assert!(!first.id.is_empty());
    assert_eq!(first.title, TITLE_ONE);
    assert_eq!(first.description, DESCRIPTION);
    assert_eq!(first.status, TaskStatus::Open);
    let second = client.create(&NewTask::new(TITLE_TWO, DESCRIPTION)).await?;
    assert_ne!(first.id, second.id);

    let listed = client.list().await?.into_json().ok_or("list answered with a message")?;
    let titles: Vec<&str> = listed.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec![TITLE_ONE, TITLE_TWO]);

    assert_eq!(client.get(&first.id).await?, TaskReply::Json(first.clone()));

    let done = client
        .update_status(&first.id, TaskStatus::Done)
        .await?
        .into_json()
        .ok_or("update to DONE answered with a message")?;
    assert_eq!(done.status, TaskStatus::Done);

    let reopen = client.update_status(&first.id, TaskStatus::Open).await?;
    assert_eq!(reopen.message(), Some(DONE_TASK_CANNOT_REOPEN));
    let reread = client.get(&first.id).await?.into_json().ok_or("task vanished")?;
    assert_eq!(reread.status, TaskStatus::Done);

    assert_eq!(client.delete(&first.id).await?, TASK_DELETED);
    assert_eq!(client.get(&first.id).await?.message(), Some(CANT_FIND_TASK));
    reporter.artifacts().write_json("remaining_tasks.json", &client.list().await?.into_json())?;

    reporter.finish(
        "pass",
        vec!["create, list, read, close, refuse reopen, and delete verified".to_string()],
        vec![
            "summary.json".to_string(),
            "summary.md".to_string(),
            "remaining_tasks.json".to_string(),
        ],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tasks_client_encodes_ids_as_one_segment() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("tasks_client_encodes_ids_as_one_segment")?;
    let target = tasks_target()?;
    let client = TasksClient::new(target.service_client()?);

    client.delete_all().await?;
    client.create(&NewTask::new(TITLE_ONE, DESCRIPTION)).await?;
    let lookup = client.get("../tasks").await?;
    assert_eq!(lookup.message(), Some(CANT_FIND_TASK));

    reporter.finish(
        "pass",
        vec!["reserved characters in ids never escape the task path".to_string()],
        vec!["summary.json".to_string(), "summary.md".to_string()],
    )?;
    Ok(())
}
