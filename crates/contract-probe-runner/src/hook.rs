// crates/contract-probe-runner/src/hook.rs
// ============================================================================
// Module: Before-Each Hooks
// Description: Awaited setup actions executed before every case.
// Purpose: Reset remote state so cases start from a known baseline.
// Dependencies: async-trait, contract-probe-core, thiserror
// ============================================================================

//! ## Overview
//! A [`BeforeEachHook`] runs to completion before each case starts. The runner
//! decides what a failed hook means through [`HookFailurePolicy`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use contract_probe_core::Scenario;
use contract_probe_core::ScenarioError;
use contract_probe_core::Verdict;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::verifier::Verifier;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// What a failed before-each hook does to the case it precedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookFailurePolicy {
    /// Record the failure and run the case anyway.
    #[default]
    Tolerate,
    /// Mark the case failed and skip its scenarios.
    FailCase,
}

impl HookFailurePolicy {
    /// Returns the policy label used in audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tolerate => "tolerate",
            Self::FailCase => "fail_case",
        }
    }
}

/// Before-each hook failures.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook's request definition is invalid.
    #[error("invalid hook: {0}")]
    Invalid(#[from] ScenarioError),
    /// The hook ran and failed.
    #[error("hook failed: {0}")]
    Failed(String),
}

/// Setup action awaited before every case.
#[async_trait]
pub trait BeforeEachHook: Send + Sync {
    /// Short label for reports and audit events.
    fn name(&self) -> &str;

    /// Runs the hook.
    ///
    /// # Errors
    ///
    /// Returns [`HookError`] when the hook cannot complete.
    async fn run(&self) -> Result<(), HookError>;
}

/// Hook that does nothing.
pub struct NoopHook;

#[async_trait]
impl BeforeEachHook for NoopHook {
    fn name(&self) -> &str {
        "noop"
    }

    async fn run(&self) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hook that sends one request, such as `DELETE /tasks`.
///
/// # Invariants
/// - By default any completed response counts as success; only transport
///   failures fail the hook. [`RequestHook::require_pass`] also enforces the
///   scenario's expected outcome.
pub struct RequestHook {
    /// Verifier for the target service.
    verifier: Verifier,
    /// Reset request.
    scenario: Scenario,
    /// Whether the scenario verdict must pass.
    require_pass: bool,
}

impl RequestHook {
    /// Creates a hook that sends `scenario` through `verifier`.
    #[must_use]
    pub const fn new(verifier: Verifier, scenario: Scenario) -> Self {
        Self {
            verifier,
            scenario,
            require_pass: false,
        }
    }

    /// Also fails the hook when the response does not satisfy the scenario.
    #[must_use]
    pub const fn require_pass(mut self) -> Self {
        self.require_pass = true;
        self
    }
}

#[async_trait]
impl BeforeEachHook for RequestHook {
    fn name(&self) -> &str {
        &self.scenario.name
    }

    async fn run(&self) -> Result<(), HookError> {
        let observation = self.verifier.execute(&self.scenario).await?;
        match observation.verdict {
            Verdict::Pass => Ok(()),
            Verdict::Fail(failure) if observation.status.is_none() || self.require_pass => {
                Err(HookError::Failed(failure.to_string()))
            }
            Verdict::Fail(_) => Ok(()),
        }
    }
}
