// crates/contract-probe-runner/src/report.rs
// ============================================================================
// Module: Suite Reports
// Description: Per-scenario, per-case, and per-suite results.
// Purpose: Summarize a run for humans (text, markdown) and tools (JCS JSON).
// Dependencies: contract-probe-core, serde, serde_jcs
// ============================================================================

//! ## Overview
//! A [`SuiteReport`] is built once a suite finishes. JSON output uses
//! canonical JCS serialization so identical runs produce identical bytes
//! apart from timing fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use contract_probe_core::HttpMethod;
use contract_probe_core::Scenario;
use contract_probe_core::ScenarioError;
use serde::Serialize;
use thiserror::Error;

use crate::verifier::Observation;

// ============================================================================
// SECTION: Status Types
// ============================================================================

/// Result of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// The response satisfied the expectation.
    Passed,
    /// The scenario failed or could not be sent.
    Failed,
    /// Not executed because an earlier step of its case failed.
    Skipped,
}

impl ScenarioStatus {
    /// Returns the snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Returns the bracketed tag used in text output.
    const fn tag(self) -> &'static str {
        match self {
            Self::Passed => "[PASS]",
            Self::Failed => "[FAIL]",
            Self::Skipped => "[SKIP]",
        }
    }
}

/// Result of a case or a whole suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every scenario passed.
    Passed,
    /// At least one scenario (or a fail-case hook) failed.
    Failed,
}

impl RunStatus {
    /// Returns the snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    /// Returns the bracketed tag used in text output.
    const fn tag(self) -> &'static str {
        match self {
            Self::Passed => "[PASS]",
            Self::Failed => "[FAIL]",
        }
    }
}

/// Failure label for scenarios rejected before any request was sent.
pub const CONFIGURATION_FAILURE: &str = "configuration";

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL when one was built.
    pub url: Option<String>,
    /// Scenario result.
    pub status: ScenarioStatus,
    /// HTTP status when a response arrived.
    pub http_status: Option<u16>,
    /// `transport`, `parse`, `assertion`, or `configuration` on failure.
    pub failure_kind: Option<String>,
    /// Diagnostic message on failure or skip.
    pub reason: Option<String>,
    /// Round-trip time in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Builds a report from an executed scenario.
    #[must_use]
    pub fn from_observation(scenario: &Scenario, observation: &Observation) -> Self {
        let failure = observation.verdict.failure();
        Self {
            name: scenario.name.clone(),
            method: scenario.method,
            url: Some(observation.url.to_string()),
            status: if failure.is_some() { ScenarioStatus::Failed } else { ScenarioStatus::Passed },
            http_status: observation.status,
            failure_kind: failure.map(|failure| failure.kind.as_str().to_string()),
            reason: failure.map(ToString::to_string),
            duration_ms: millis(observation.elapsed),
        }
    }

    /// Builds a report for a scenario rejected before sending.
    #[must_use]
    pub fn configuration_error(scenario: &Scenario, error: &ScenarioError) -> Self {
        Self {
            name: scenario.name.clone(),
            method: scenario.method,
            url: None,
            status: ScenarioStatus::Failed,
            http_status: None,
            failure_kind: Some(CONFIGURATION_FAILURE.to_string()),
            reason: Some(error.to_string()),
            duration_ms: 0,
        }
    }

    /// Builds a report for a scenario that was not executed.
    #[must_use]
    pub fn skipped(scenario: &Scenario, reason: impl Into<String>) -> Self {
        Self {
            name: scenario.name.clone(),
            method: scenario.method,
            url: None,
            status: ScenarioStatus::Skipped,
            http_status: None,
            failure_kind: None,
            reason: Some(reason.into()),
            duration_ms: 0,
        }
    }
}

/// Outcome of the before-each hook for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookReport {
    /// Hook label.
    pub name: String,
    /// Error message when the hook failed.
    pub error: Option<String>,
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub name: String,
    /// Case result.
    pub status: RunStatus,
    /// Before-each hook result.
    pub hook: HookReport,
    /// Scenario results in declaration order.
    pub scenarios: Vec<ScenarioReport>,
    /// Case wall-clock time in milliseconds (hook included).
    pub duration_ms: u64,
}

impl CaseReport {
    /// Builds a case report; the case fails if any scenario failed.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hook: HookReport,
        hook_fails_case: bool,
        scenarios: Vec<ScenarioReport>,
        elapsed: Duration,
    ) -> Self {
        let any_failed = scenarios.iter().any(|scenario| scenario.status == ScenarioStatus::Failed);
        let status =
            if any_failed || hook_fails_case { RunStatus::Failed } else { RunStatus::Passed };
        Self {
            name: name.into(),
            status,
            hook,
            scenarios,
            duration_ms: millis(elapsed),
        }
    }
}

/// Aggregate counts for a suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    /// Cases that passed.
    pub cases_passed: usize,
    /// Cases that failed.
    pub cases_failed: usize,
    /// Scenarios that passed.
    pub scenarios_passed: usize,
    /// Scenarios that failed.
    pub scenarios_failed: usize,
    /// Scenarios that were skipped.
    pub scenarios_skipped: usize,
}

/// Outcome of one suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// Target service key.
    pub service: String,
    /// Stage the suite ran against.
    pub stage: String,
    /// Service base URL.
    pub base_url: String,
    /// Overall result.
    pub status: RunStatus,
    /// Aggregate counts.
    pub counts: ReportCounts,
    /// Suite wall-clock time in milliseconds.
    pub duration_ms: u64,
    /// Case results in declaration order.
    pub cases: Vec<CaseReport>,
}

/// Identity of a suite run, used to label its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLabel {
    /// Suite name.
    pub suite: String,
    /// Target service key.
    pub service: String,
    /// Stage name.
    pub stage: String,
    /// Service base URL.
    pub base_url: String,
}

impl SuiteReport {
    /// Builds a suite report and computes its counts.
    #[must_use]
    pub fn new(label: RunLabel, cases: Vec<CaseReport>, elapsed: Duration) -> Self {
        let mut counts = ReportCounts::default();
        for case in &cases {
            match case.status {
                RunStatus::Passed => counts.cases_passed += 1,
                RunStatus::Failed => counts.cases_failed += 1,
            }
            for scenario in &case.scenarios {
                match scenario.status {
                    ScenarioStatus::Passed => counts.scenarios_passed += 1,
                    ScenarioStatus::Failed => counts.scenarios_failed += 1,
                    ScenarioStatus::Skipped => counts.scenarios_skipped += 1,
                }
            }
        }
        let status = if counts.cases_failed == 0 { RunStatus::Passed } else { RunStatus::Failed };
        Self {
            suite: label.suite,
            service: label.service,
            stage: label.stage,
            base_url: label.base_url,
            status,
            counts,
            duration_ms: millis(elapsed),
            cases,
        }
    }

    /// Returns true when every case passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == RunStatus::Passed
    }

    /// Serializes the report as canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] when serialization fails.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, ReportError> {
        serde_jcs::to_vec(self).map_err(|err| ReportError::Serialize(err.to_string()))
    }

    /// Renders a plain-text summary, one line per case and scenario.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} suite `{}` (stage {}, {}): {}/{} cases passed; {} scenarios passed, {} failed, {} skipped",
            self.status.tag(),
            self.suite,
            self.stage,
            self.base_url,
            self.counts.cases_passed,
            self.cases.len(),
            self.counts.scenarios_passed,
            self.counts.scenarios_failed,
            self.counts.scenarios_skipped,
        );
        for case in &self.cases {
            let _ = writeln!(out, "  {} {}", case.status.tag(), case.name);
            if let Some(error) = &case.hook.error {
                let _ = writeln!(out, "      hook `{}`: {error}", case.hook.name);
            }
            for scenario in &case.scenarios {
                let _ = write!(out, "    {} {}", scenario.status.tag(), scenario.name);
                if let Some(reason) = &scenario.reason {
                    let _ = write!(out, ": {reason}");
                }
                out.push('\n');
            }
        }
        out
    }

    /// Renders a markdown summary.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Contract Suite: {}\n", self.suite);
        out.push_str("## Status\n\n");
        let _ = writeln!(out, "- Status: {}", self.status.as_str());
        let _ = writeln!(out, "- Service: {} ({})", self.service, self.base_url);
        let _ = writeln!(out, "- Stage: {}", self.stage);
        let _ = writeln!(out, "- Duration (ms): {}", self.duration_ms);
        let _ = writeln!(
            out,
            "- Scenarios: {} passed, {} failed, {} skipped",
            self.counts.scenarios_passed,
            self.counts.scenarios_failed,
            self.counts.scenarios_skipped
        );
        out.push_str("\n## Cases\n");
        for case in &self.cases {
            let _ = writeln!(out, "\n### {} ({})\n", case.name, case.status.as_str());
            if let Some(error) = &case.hook.error {
                let _ = writeln!(out, "- Hook `{}` failed: {error}", case.hook.name);
            }
            for scenario in &case.scenarios {
                let _ = write!(
                    out,
                    "- {} `{} {}`: {}",
                    scenario.name,
                    scenario.method,
                    scenario.url.as_deref().unwrap_or("-"),
                    scenario.status.as_str()
                );
                if let Some(reason) = &scenario.reason {
                    let _ = write!(out, " ({reason})");
                }
                out.push('\n');
            }
        }
        out
    }

    /// Writes `<suite>.json` and `<suite>.md` into `dir`, creating it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or I/O fails.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(dir)
            .map_err(|err| ReportError::Io(format!("{}: {err}", dir.display())))?;
        let stem = file_stem(&self.suite);
        let json_path = dir.join(format!("{stem}.json"));
        let markdown_path = dir.join(format!("{stem}.md"));
        fs::write(&json_path, self.to_canonical_json()?)
            .map_err(|err| ReportError::Io(format!("{}: {err}", json_path.display())))?;
        fs::write(&markdown_path, self.render_markdown())
            .map_err(|err| ReportError::Io(format!("{}: {err}", markdown_path.display())))?;
        Ok(vec![json_path, markdown_path])
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report output errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report serialization failed.
    #[error("report serialization error: {0}")]
    Serialize(String),
    /// Writing the report failed.
    #[error("report io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Maps a suite name onto the stem of its report files.
#[must_use]
pub fn file_stem(suite: &str) -> String {
    let stem: String = suite
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if stem.is_empty() { "suite".to_string() } else { stem }
}
