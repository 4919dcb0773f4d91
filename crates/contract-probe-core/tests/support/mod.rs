// crates/contract-probe-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers for core integration tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions.

#![allow(dead_code, reason = "Helpers are selectively used across suites.")]

use std::error::Error;
use std::fmt;

use contract_probe_core::FailureKind;
use contract_probe_core::Verdict;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl TestError {
    /// Creates a new test error with the provided message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError::new(message))) }
}

/// Requires a passing verdict.
///
/// # Errors
/// Returns a `TestError` carrying the failure reason otherwise.
pub fn ensure_pass(verdict: &Verdict, context: &str) -> TestResult {
    match verdict.failure() {
        None => Ok(()),
        Some(failure) => Err(Box::new(TestError::new(format!("{context}: {failure}")))),
    }
}

/// Requires a failing verdict of `kind` whose rendered message contains `needle`.
///
/// # Errors
/// Returns a `TestError` when the verdict passes or differs.
pub fn ensure_fail(verdict: &Verdict, kind: FailureKind, needle: &str, context: &str) -> TestResult {
    let Some(failure) = verdict.failure() else {
        return Err(Box::new(TestError::new(format!("{context}: expected failure, got pass"))));
    };
    ensure(
        failure.kind == kind,
        format!("{context}: expected {} failure, got {}", kind.as_str(), failure.kind.as_str()),
    )?;
    let rendered = failure.to_string();
    ensure(rendered.contains(needle), format!("{context}: `{rendered}` lacks `{needle}`"))
}
