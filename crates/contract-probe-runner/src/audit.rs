// crates/contract-probe-runner/src/audit.rs
// ============================================================================
// Module: Run Audit Logging
// Description: Structured JSON-lines events emitted while suites run.
// Purpose: Record hook, scenario, and suite outcomes without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every event carries an `event` label and `timestamp_ms`. Sinks write one
//! JSON object per line; write failures are ignored so logging never changes
//! a run's result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use contract_probe_core::HttpMethod;
use serde::Serialize;

use crate::hook::HookFailurePolicy;
use crate::report::ScenarioReport;
use crate::report::ScenarioStatus;
use crate::report::SuiteReport;
use crate::report::millis;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Before-each hook outcome.
#[derive(Debug, Clone, Serialize)]
pub struct HookAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Suite name.
    pub suite: String,
    /// Case the hook preceded.
    pub case: String,
    /// Hook label.
    pub hook: String,
    /// Whether the hook completed.
    pub ok: bool,
    /// Error message when the hook failed.
    pub error: Option<String>,
    /// Failure policy in force.
    pub policy: &'static str,
}

/// Scenario outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Suite name.
    pub suite: String,
    /// Case name.
    pub case: String,
    /// Scenario name.
    pub scenario: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL when one was built.
    pub url: Option<String>,
    /// Scenario result.
    pub status: ScenarioStatus,
    /// HTTP status when a response arrived.
    pub http_status: Option<u16>,
    /// Failure classification.
    pub failure_kind: Option<String>,
    /// Diagnostic message.
    pub reason: Option<String>,
    /// Round-trip time in milliseconds.
    pub duration_ms: u64,
}

/// Suite totals.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Suite name.
    pub suite: String,
    /// Service key.
    pub service: String,
    /// Stage name.
    pub stage: String,
    /// `passed` or `failed`.
    pub status: &'static str,
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
    /// Suite wall-clock time in milliseconds.
    pub duration_ms: u64,
}

impl HookAuditEvent {
    /// Creates a hook event with a consistent timestamp.
    #[must_use]
    pub fn new(
        suite: &str,
        case: &str,
        hook: &str,
        error: Option<String>,
        policy: HookFailurePolicy,
    ) -> Self {
        Self {
            event: "hook_result",
            timestamp_ms: now_millis(),
            suite: suite.to_string(),
            case: case.to_string(),
            hook: hook.to_string(),
            ok: error.is_none(),
            error,
            policy: policy.as_str(),
        }
    }
}

impl ScenarioAuditEvent {
    /// Creates a scenario event from its report entry.
    #[must_use]
    pub fn new(suite: &str, case: &str, report: &ScenarioReport) -> Self {
        Self {
            event: "scenario_result",
            timestamp_ms: now_millis(),
            suite: suite.to_string(),
            case: case.to_string(),
            scenario: report.name.clone(),
            method: report.method,
            url: report.url.clone(),
            status: report.status,
            http_status: report.http_status,
            failure_kind: report.failure_kind.clone(),
            reason: report.reason.clone(),
            duration_ms: report.duration_ms,
        }
    }
}

impl SuiteAuditEvent {
    /// Creates a summary event from a finished report.
    #[must_use]
    pub fn new(report: &SuiteReport) -> Self {
        Self {
            event: "suite_summary",
            timestamp_ms: now_millis(),
            suite: report.suite.clone(),
            service: report.service.clone(),
            stage: report.stage.clone(),
            status: report.status.as_str(),
            cases_passed: report.counts.cases_passed,
            cases_failed: report.counts.cases_failed,
            scenarios_passed: report.counts.scenarios_passed,
            scenarios_failed: report.counts.scenarios_failed,
            scenarios_skipped: report.counts.scenarios_skipped,
            duration_ms: report.duration_ms,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for run events.
pub trait AuditSink: Send + Sync {
    /// Record a hook event.
    fn record_hook(&self, _event: &HookAuditEvent) {}

    /// Record a scenario event.
    fn record_scenario(&self, _event: &ScenarioAuditEvent) {}

    /// Record a suite summary event.
    fn record_suite(&self, _event: &SuiteAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one event line to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl AuditSink for StderrAuditSink {
    fn record_hook(&self, event: &HookAuditEvent) {
        Self::emit(event);
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        Self::emit(event);
    }

    fn record_suite(&self, event: &SuiteAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event line and flushes.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_hook(&self, event: &HookAuditEvent) {
        self.emit(event);
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        self.emit(event);
    }

    fn record_suite(&self, event: &SuiteAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}
