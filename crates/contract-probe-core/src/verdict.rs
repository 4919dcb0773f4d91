// crates/contract-probe-core/src/verdict.rs
// ============================================================================
// Module: Verdicts
// Description: Pass/fail outcome of judging a response.
// Purpose: Carry a failure class and diagnostic for every failed check.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Verdict`] is either a pass or a [`Failure`] tagged with the stage that
//! failed: transport, JSON parsing, or the assertion itself.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Failure
// ============================================================================

/// Failure classification.
///
/// # Invariants
/// - Variants are stable labels for reports and audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection, DNS, or body read failure.
    Transport,
    /// A structural check was requested but the body is not JSON.
    Parse,
    /// Data was present but did not match the expectation.
    Assertion,
}

impl FailureKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::Assertion => "assertion",
        }
    }
}

/// A failed check with its diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure class.
    pub kind: FailureKind,
    /// Diagnostic detail (without the class prefix).
    pub reason: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Transport => write!(f, "network error: {}", self.reason),
            FailureKind::Parse => write!(f, "invalid JSON: {}", self.reason),
            FailureKind::Assertion => f.write_str(&self.reason),
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Result of evaluating one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// The response satisfied the expectation.
    Pass,
    /// The response (or the transport) failed the expectation.
    Fail(Failure),
}

impl Verdict {
    /// Builds a transport failure.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::fail(FailureKind::Transport, reason)
    }

    /// Builds a JSON parse failure.
    #[must_use]
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::fail(FailureKind::Parse, reason)
    }

    /// Builds an assertion failure.
    #[must_use]
    pub fn assertion(reason: impl Into<String>) -> Self {
        Self::fail(FailureKind::Assertion, reason)
    }

    /// Builds a failure of the given kind.
    #[must_use]
    pub fn fail(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Fail(Failure {
            kind,
            reason: reason.into(),
        })
    }

    /// Returns true for [`Verdict::Pass`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Pass => None,
            Self::Fail(failure) => Some(failure),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Fail(failure) => write!(f, "fail: {failure}"),
        }
    }
}
