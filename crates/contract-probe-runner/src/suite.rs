// crates/contract-probe-runner/src/suite.rs
// ============================================================================
// Module: Suite Runner
// Description: Ordered cases of scenarios with an awaited before-each hook.
// Purpose: Run contract suites sequentially and collect a report.
// Dependencies: contract-probe-core, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Suite`] targets one service and lists [`Case`]s in order. The
//! [`SuiteRunner`] executes them strictly one at a time:
//!
//! 1. await the before-each hook;
//! 2. run the case's scenarios in order, threading captured bindings;
//! 3. stop the case at the first failure and mark the rest skipped.
//!
//! A failed case never stops the suite. Every scenario is validated, and every
//! template is checked against the captures that precede it, before the first
//! request is sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use contract_probe_core::Bindings;
use contract_probe_core::Scenario;
use contract_probe_core::ScenarioError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::HookAuditEvent;
use crate::audit::NoopAuditSink;
use crate::audit::ScenarioAuditEvent;
use crate::audit::SuiteAuditEvent;
use crate::hook::BeforeEachHook;
use crate::hook::HookFailurePolicy;
use crate::hook::NoopHook;
use crate::hook::RequestHook;
use crate::report::CaseReport;
use crate::report::HookReport;
use crate::report::RunLabel;
use crate::report::ScenarioReport;
use crate::report::ScenarioStatus;
use crate::report::SuiteReport;
use crate::verifier::Verifier;

// ============================================================================
// SECTION: Model
// ============================================================================

/// Named, ordered scenarios sharing captured bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Case {
    /// Case name.
    pub name: String,
    /// Scenarios in execution order.
    pub scenarios: Vec<Scenario>,
}

impl Case {
    /// Creates a case.
    #[must_use]
    pub fn new(name: impl Into<String>, scenarios: Vec<Scenario>) -> Self {
        Self {
            name: name.into(),
            scenarios,
        }
    }
}

/// Named, ordered cases against one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    /// Suite name.
    pub name: String,
    /// Service key resolved through the stage environment.
    pub service: String,
    /// Request sent before every case to reset remote state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<Scenario>,
    /// What a failed reset does to its case.
    #[serde(default)]
    pub hook_policy: HookFailurePolicy,
    /// Cases in execution order.
    pub cases: Vec<Case>,
}

impl Suite {
    /// Creates a suite with no reset request.
    #[must_use]
    pub fn new(name: impl Into<String>, service: impl Into<String>, cases: Vec<Case>) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            reset: None,
            hook_policy: HookFailurePolicy::default(),
            cases,
        }
    }

    /// Sends `reset` before every case.
    #[must_use]
    pub fn with_reset(mut self, reset: Scenario) -> Self {
        self.reset = Some(reset);
        self
    }

    /// Sets the hook failure policy.
    #[must_use]
    pub const fn with_hook_policy(mut self, policy: HookFailurePolicy) -> Self {
        self.hook_policy = policy;
        self
    }

    /// Checks the whole suite for configuration errors.
    ///
    /// Templates may only reference variables captured by an earlier scenario
    /// of the same case.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), SuiteError> {
        if self.name.trim().is_empty() {
            return Err(SuiteError::Invalid("suite name must not be empty".to_string()));
        }
        if self.service.trim().is_empty() {
            return Err(SuiteError::Invalid(format!(
                "suite `{}` must name a service",
                self.name
            )));
        }
        if self.cases.is_empty() {
            return Err(SuiteError::Invalid(format!("suite `{}` has no cases", self.name)));
        }
        if let Some(reset) = &self.reset {
            reset.validate()?;
            reset.resolve(&Bindings::new())?;
        }
        let mut seen = BTreeSet::new();
        for case in &self.cases {
            if case.name.trim().is_empty() {
                return Err(SuiteError::Invalid(format!(
                    "suite `{}` has a case without a name",
                    self.name
                )));
            }
            if !seen.insert(case.name.as_str()) {
                return Err(SuiteError::Invalid(format!(
                    "suite `{}` defines case `{}` more than once",
                    self.name, case.name
                )));
            }
            if case.scenarios.is_empty() {
                return Err(SuiteError::Invalid(format!("case `{}` has no scenarios", case.name)));
            }
            let mut declared = Bindings::new();
            for scenario in &case.scenarios {
                scenario.validate()?;
                scenario.resolve(&declared)?;
                for name in scenario.captures.keys() {
                    declared.insert(name.clone(), "captured");
                }
            }
        }
        Ok(())
    }
}

/// Suite configuration errors.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// Structural problem with the suite.
    #[error("invalid suite: {0}")]
    Invalid(String),
    /// A scenario is invalid or references an unknown variable.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Sequential suite executor bound to one service base URL.
pub struct SuiteRunner {
    /// Verifier for the suite's service.
    verifier: Verifier,
    /// Stage label for reports.
    stage: String,
    /// Hook override; the suite's reset request is used when unset.
    hook: Option<Arc<dyn BeforeEachHook>>,
    /// Audit sink for run events.
    audit: Arc<dyn AuditSink>,
}

impl SuiteRunner {
    /// Creates a runner with no audit logging.
    #[must_use]
    pub fn new(verifier: Verifier, stage: impl Into<String>) -> Self {
        Self {
            verifier,
            stage: stage.into(),
            hook: None,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the suite's reset request with a custom hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn BeforeEachHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Routes run events to `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Runs every case of `suite` in order.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError`] when the suite fails validation; nothing is sent
    /// in that case. Scenario failures are reported, not returned.
    pub async fn run(&self, suite: &Suite) -> Result<SuiteReport, SuiteError> {
        suite.validate()?;
        let hook = self.effective_hook(suite);
        let started = Instant::now();
        let mut cases = Vec::with_capacity(suite.cases.len());
        for case in &suite.cases {
            cases.push(self.run_case(suite, hook.as_ref(), case).await);
        }
        let report = SuiteReport::new(
            RunLabel {
                suite: suite.name.clone(),
                service: suite.service.clone(),
                stage: self.stage.clone(),
                base_url: self.verifier.base_url().to_string(),
            },
            cases,
            started.elapsed(),
        );
        self.audit.record_suite(&SuiteAuditEvent::new(&report));
        Ok(report)
    }

    /// Picks the override hook, the suite reset request, or a no-op.
    fn effective_hook(&self, suite: &Suite) -> Arc<dyn BeforeEachHook> {
        if let Some(hook) = &self.hook {
            return Arc::clone(hook);
        }
        match &suite.reset {
            Some(reset) => Arc::new(RequestHook::new(self.verifier.clone(), reset.clone())),
            None => Arc::new(NoopHook),
        }
    }

    /// Runs one case after awaiting the hook.
    async fn run_case(&self, suite: &Suite, hook: &dyn BeforeEachHook, case: &Case) -> CaseReport {
        let started = Instant::now();
        let hook_error = hook.run().await.err().map(|err| err.to_string());
        self.audit.record_hook(&HookAuditEvent::new(
            &suite.name,
            &case.name,
            hook.name(),
            hook_error.clone(),
            suite.hook_policy,
        ));
        let hook_fails_case =
            hook_error.is_some() && suite.hook_policy == HookFailurePolicy::FailCase;
        let hook_report = HookReport {
            name: hook.name().to_string(),
            error: hook_error,
        };

        let mut scenarios = Vec::with_capacity(case.scenarios.len());
        let mut bindings = Bindings::new();
        let mut halted_by: Option<String> = hook_fails_case.then(|| "before-each hook".to_string());
        for scenario in &case.scenarios {
            let report = match &halted_by {
                Some(cause) => {
                    ScenarioReport::skipped(scenario, format!("skipped after {cause} failed"))
                }
                None => match self.verifier.execute_with(scenario, &bindings).await {
                    Ok(observation) => {
                        bindings.extend(observation.captured.clone());
                        ScenarioReport::from_observation(scenario, &observation)
                    }
                    Err(err) => ScenarioReport::configuration_error(scenario, &err),
                },
            };
            if halted_by.is_none() && report.status == ScenarioStatus::Failed {
                halted_by = Some(format!("`{}`", scenario.name));
            }
            self.audit.record_scenario(&ScenarioAuditEvent::new(&suite.name, &case.name, &report));
            scenarios.push(report);
        }
        CaseReport::new(case.name.clone(), hook_report, hook_fails_case, scenarios, started.elapsed())
    }
}
