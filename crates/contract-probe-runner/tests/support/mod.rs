// crates/contract-probe-runner/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Local HTTP stub and recording audit sink for runner tests.
// ============================================================================
//! ## Overview
//! The stub serves a handful of fixed routes so verifier and runner behavior
//! can be pinned without external services.

#![allow(dead_code, reason = "Helpers are selectively used across suites.")]

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::routing::get;
use contract_probe_runner::AuditSink;
use contract_probe_runner::audit::HookAuditEvent;
use contract_probe_runner::audit::ScenarioAuditEvent;
use contract_probe_runner::audit::SuiteAuditEvent;
use serde_json::Value;
use serde_json::json;
use url::Url;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across runner integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError(String);

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError(message.into()))) }
}

// ========================================================================
// HTTP Stub
// ========================================================================

/// Shared stub state.
#[derive(Default)]
pub struct StubState {
    /// Number of `DELETE /items` calls.
    pub resets: AtomicUsize,
}

/// Running stub handle.
pub struct Stub {
    /// Base URL ending in `/`.
    pub base_url: Url,
    /// Shared state.
    pub state: Arc<StubState>,
}

/// Starts the stub on an ephemeral port inside the current runtime.
///
/// # Errors
/// Returns an error when binding fails.
pub async fn spawn_stub() -> TestResult<Stub> {
    let state = Arc::new(StubState::default());
    let router = Router::new()
        .route("/", get(evaluate))
        .route("/text", get(|| async { "plain text, not JSON" }))
        .route("/items", get(list_items).post(create_item).delete(reset_items))
        .route("/items/{id}", get(fetch_item))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(Stub {
        base_url: Url::parse(&format!("http://{addr}/"))?,
        state,
    })
}

/// Returns a base URL on a port with no listener.
///
/// # Errors
/// Returns an error when the probe socket cannot be bound.
pub async fn unreachable_base_url() -> TestResult<Url> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(Url::parse(&format!("http://{addr}/"))?)
}

async fn evaluate(Query(params): Query<HashMap<String, String>>) -> String {
    match params.get("expr").map(String::as_str) {
        Some("2*(7-3)") => "8".to_string(),
        Some("2*(7-3") => "Error: Parenthesis ) expected (char 6)".to_string(),
        _ => "Error: Unexpected end of expression".to_string(),
    }
}

async fn list_items() -> Json<Value> {
    Json(json!([{"id": "item-1", "title": "A"}]))
}

async fn create_item(Json(body): Json<Value>) -> Json<Value> {
    let title = body.get("title").cloned().unwrap_or(Value::Null);
    Json(json!({"id": "item-1", "title": title, "status": "OPEN"}))
}

async fn fetch_item(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"id": id, "title": "A"}))
}

async fn reset_items(State(state): State<Arc<StubState>>) -> &'static str {
    state.resets.fetch_add(1, Ordering::SeqCst);
    "All tasks were deleted!"
}

// ========================================================================
// Recording Audit Sink
// ========================================================================

/// Audit sink that keeps event labels in order.
#[derive(Default)]
pub struct RecordingSink {
    /// `event:detail` entries.
    pub events: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Returns a copy of the recorded entries.
    pub fn snapshot(&self) -> Vec<String> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn push(&self, entry: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(entry);
        }
    }
}

impl AuditSink for RecordingSink {
    fn record_hook(&self, event: &HookAuditEvent) {
        self.push(format!("{}:{}:{}", event.event, event.case, event.ok));
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        self.push(format!("{}:{}:{}", event.event, event.scenario, event.status.as_str()));
    }

    fn record_suite(&self, event: &SuiteAuditEvent) {
        self.push(format!("{}:{}:{}", event.event, event.suite, event.status));
    }
}
