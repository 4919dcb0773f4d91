// crates/contract-probe-core/src/error.rs
// ============================================================================
// Module: Scenario Errors
// Description: Configuration errors raised before a scenario touches the network.
// Purpose: Separate malformed scenarios from failing responses.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`ScenarioError`] means the scenario itself is unusable: it is reported
//! before any request is sent. Responses that do not match an expectation are
//! never errors; they produce a failing [`crate::Verdict`] instead.

use thiserror::Error;

/// Errors describing a scenario that cannot be executed.
///
/// # Invariants
/// - Raised only before network I/O; never describes a remote response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// Structural problem with the scenario definition.
    #[error("invalid scenario `{scenario}`: {reason}")]
    Invalid {
        /// Scenario name (may be empty when the name itself is invalid).
        scenario: String,
        /// Human-readable reason.
        reason: String,
    },
    /// A `{{name}}` template referenced a variable nobody captured.
    #[error("scenario `{scenario}` references unbound variable `{name}`")]
    UnboundVariable {
        /// Scenario name.
        scenario: String,
        /// Variable name as written in the template.
        name: String,
    },
}

impl ScenarioError {
    /// Builds an [`ScenarioError::Invalid`] for the named scenario.
    #[must_use]
    pub fn invalid(scenario: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            scenario: scenario.into(),
            reason: reason.into(),
        }
    }
}
