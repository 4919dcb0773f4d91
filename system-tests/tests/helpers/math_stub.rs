// system-tests/tests/helpers/math_stub.rs
// ============================================================================
// Module: Math Service Stub
// Description: In-process expression evaluator honoring the math contracts.
// Purpose: Run the math suite hermetically with fixed answers.
// Dependencies: axum, contract-probe-services, tokio
// ============================================================================

//! ## Overview
//! The stub answers from a fixture table rather than parsing expressions.
//! A trailing operator and unbalanced parentheses (checked in that order)
//! produce the evaluator's error lines, with the `(char N)` suffix the real
//! service appends.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::State;
use axum::routing::get;
use contract_probe_services::math::BatchOutcome;
use contract_probe_services::math::BatchRequest;
use contract_probe_services::math::MISSING_PARENTHESIS;
use contract_probe_services::math::UNEXPECTED_END;
use serde::Deserialize;
use tokio::time::sleep;
use url::Url;

use super::stub_server::StubServer;
use super::stub_server::spawn_router;

/// Significant digits used when a request names no precision.
const DEFAULT_PRECISION: usize = 14;

/// Shared math stub state.
#[derive(Debug, Default)]
pub struct MathStubState {
    requests: AtomicUsize,
    delay: Duration,
}

impl MathStubState {
    /// Returns the number of requests served.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Running math stub.
pub struct MathStub {
    server: StubServer,
    state: Arc<MathStubState>,
}

impl MathStub {
    /// Returns the base URL (`http://127.0.0.1:<port>/`).
    pub fn base_url(&self) -> &Url {
        self.server.base_url()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &MathStubState {
        &self.state
    }
}

/// Starts a math stub that answers immediately.
pub fn spawn_math_stub() -> Result<MathStub, String> {
    spawn_math_stub_with_delay(Duration::ZERO)
}

/// Starts a math stub that waits `delay` before every answer.
pub fn spawn_math_stub_with_delay(delay: Duration) -> Result<MathStub, String> {
    let state = Arc::new(MathStubState {
        requests: AtomicUsize::new(0),
        delay,
    });
    let app = Router::new()
        .route("/", get(handle_evaluate).post(handle_batch))
        .with_state(Arc::clone(&state));
    let server = spawn_router(app, "/")?;
    Ok(MathStub {
        server,
        state,
    })
}

#[derive(Debug, Deserialize)]
struct EvaluateQuery {
    expr: Option<String>,
    precision: Option<u32>,
}

async fn handle_evaluate(
    State(state): State<Arc<MathStubState>>,
    Query(query): Query<EvaluateQuery>,
) -> String {
    begin_request(&state).await;
    let Some(expr) = query.expr else {
        return "Error: Required parameter expr missing in url.".to_string();
    };
    evaluate(&expr, precision_or_default(query.precision)).unwrap_or_else(|error| error)
}

async fn handle_batch(
    State(state): State<Arc<MathStubState>>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchOutcome> {
    begin_request(&state).await;
    let precision = precision_or_default(request.precision);
    let mut result = Vec::with_capacity(request.expr.len());
    for expr in &request.expr {
        match evaluate(expr, precision) {
            Ok(value) => result.push(value),
            Err(error) => {
                return Json(BatchOutcome::Rejected {
                    error,
                });
            }
        }
    }
    Json(BatchOutcome::Evaluated {
        result,
    })
}

async fn begin_request(state: &MathStubState) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if !state.delay.is_zero() {
        sleep(state.delay).await;
    }
}

fn precision_or_default(precision: Option<u32>) -> usize {
    precision.and_then(|value| usize::try_from(value).ok()).unwrap_or(DEFAULT_PRECISION)
}

/// Evaluates one fixture expression; `Err` carries the error line.
fn evaluate(expr: &str, precision: usize) -> Result<String, String> {
    let position = expr.chars().count() + 1;
    let open = expr.chars().filter(|ch| *ch == '(').count();
    let close = expr.chars().filter(|ch| *ch == ')').count();
    if expr.trim_end().ends_with(['+', '-', '*', '/', '^']) {
        return Err(format!("{UNEXPECTED_END} (char {position})"));
    }
    if open > close {
        return Err(format!("{MISSING_PARENTHESIS} (char {position})"));
    }
    let value = match expr.trim() {
        "2*(7-3)" => "8".to_string(),
        "1+1" => "2".to_string(),
        "2 / 3" => format!("{:.precision$}", 2.0_f64 / 3.0),
        "a = 1.2 * (2 + 4.5)" => "7.8".to_string(),
        "a / 2" => "3.9".to_string(),
        "b = [-1, 2; 3, 1]" => "[[-1, 2], [3, 1]]".to_string(),
        "det(b)" => "-7".to_string(),
        other => return Err(format!("Error: Undefined symbol {other}")),
    };
    Ok(value)
}
