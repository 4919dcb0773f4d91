// crates/contract-probe-services/src/math.rs
// ============================================================================
// Module: Math Service
// Description: Typed client and contract suite for the expression evaluator.
// Purpose: Pin the evaluator's single and batch evaluation contracts.
// Dependencies: contract-probe-core, contract-probe-runner, serde
// ============================================================================

//! ## Overview
//! The math service evaluates expressions two ways:
//!
//! - `GET /?expr=..&precision=..` answers with plain text: the value, or an
//!   error line such as `Error: Parenthesis ) expected (char 6)`.
//! - `POST /` with `{ "expr": [..], "precision": n }` answers with
//!   `{ "result": [..] }` (one string per expression) or `{ "error": ".." }`.
//!
//! Later expressions in a batch may reference variables assigned by earlier
//! ones (`a = 1.2 * (2 + 4.5)` then `a / 2`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_probe_core::ExpectedOutcome;
use contract_probe_core::Scenario;
use contract_probe_runner::Case;
use contract_probe_runner::Suite;
use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::client::ClientError;
use crate::client::NoBody;
use crate::client::ServiceClient;

// ============================================================================
// SECTION: Contract Constants
// ============================================================================

/// Service key in the stage environment.
pub const SERVICE: &str = "math";
/// Error text for an unclosed parenthesis.
pub const MISSING_PARENTHESIS: &str = "Error: Parenthesis ) expected";
/// Error text for an expression that stops after an operator.
pub const UNEXPECTED_END: &str = "Error: Unexpected end of expression";

/// Batch whose expressions are all valid.
pub const VALID_BATCH: [&str; 5] =
    ["2 / 3", "a = 1.2 * (2 + 4.5)", "a / 2", "b = [-1, 2; 3, 1]", "det(b)"];
/// Batch whose second expression lacks a closing parenthesis.
pub const INVALID_BATCH: [&str; 5] =
    ["2 / 3", "a = 1.2 * (2 + 4.5", "a / 2", "b = [-1, 2; 3, 1]", "det(b)"];

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Batch evaluation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Expressions evaluated in order with a shared scope.
    pub expr: Vec<String>,
    /// Significant digits for numeric results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl BatchRequest {
    /// Builds a request from expression literals.
    #[must_use]
    pub fn new(expressions: &[&str], precision: Option<u32>) -> Self {
        Self {
            expr: expressions.iter().map(|expr| (*expr).to_string()).collect(),
            precision,
        }
    }
}

/// Batch evaluation response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    /// Every expression evaluated; one string per expression.
    Evaluated {
        /// Results in input order.
        result: Vec<String>,
    },
    /// Evaluation stopped at an error.
    Rejected {
        /// Error message.
        error: String,
    },
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Typed math service client.
#[derive(Debug, Clone)]
pub struct MathClient {
    /// Shared HTTP client.
    inner: ServiceClient,
}

impl MathClient {
    /// Wraps a service client bound to the math base URL.
    #[must_use]
    pub const fn new(inner: ServiceClient) -> Self {
        Self {
            inner,
        }
    }

    /// Evaluates one expression and returns the raw text answer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure. Expression errors come
    /// back as `Ok` text.
    pub async fn evaluate(&self, expr: &str, precision: Option<u32>) -> Result<String, ClientError> {
        let precision = precision.map(|value| value.to_string());
        let mut query = vec![("expr", expr)];
        if let Some(precision) = &precision {
            query.push(("precision", precision.as_str()));
        }
        let response = self.inner.send(Method::GET, &[], &query, None::<&NoBody>).await?;
        Ok(response.body)
    }

    /// Evaluates a batch of expressions.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or an unexpected body.
    pub async fn evaluate_batch(&self, request: &BatchRequest) -> Result<BatchOutcome, ClientError> {
        self.inner.send(Method::POST, &[], &[], Some(request)).await?.json()
    }
}

// ============================================================================
// SECTION: Contract Suite
// ============================================================================

/// Builds the math contract suite.
#[must_use]
pub fn math_suite() -> Suite {
    Suite::new(
        "math",
        SERVICE,
        vec![
            Case::new(
                "GET resolves valid and invalid expressions",
                vec![
                    Scenario::get("valid expression", "", ExpectedOutcome::exact_text("8"))
                        .with_query("expr", "2*(7-3)"),
                    Scenario::get(
                        "missing parenthesis",
                        "",
                        ExpectedOutcome::contains(MISSING_PARENTHESIS),
                    )
                    .with_query("expr", "2*(7-3"),
                    Scenario::get("unexpected end", "", ExpectedOutcome::contains(UNEXPECTED_END))
                        .with_query("expr", "2*(7-"),
                ],
            ),
            Case::new(
                "POST resolves valid and invalid expressions",
                vec![
                    Scenario::post(
                        "all valid batch",
                        "",
                        json!({"expr": VALID_BATCH, "precision": 14}),
                        ExpectedOutcome::all_of(vec![
                            ExpectedOutcome::length_equals("result", VALID_BATCH.len()),
                            ExpectedOutcome::length_equals("/result/0", 16),
                        ]),
                    ),
                    Scenario::post(
                        "one invalid batch",
                        "",
                        json!({"expr": INVALID_BATCH, "precision": 6}),
                        ExpectedOutcome::field_contains("error", MISSING_PARENTHESIS),
                    ),
                ],
            ),
        ],
    )
}
