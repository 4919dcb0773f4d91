// crates/contract-probe-runner/src/verifier.rs
// ============================================================================
// Module: Contract Verifier
// Description: Executes one scenario against a service base URL.
// Purpose: Turn a validated scenario into an HTTP round trip and a verdict.
// Dependencies: contract-probe-core, reqwest, url
// ============================================================================

//! ## Overview
//! [`Verifier`] owns an HTTP client and the base URL of one service. A call to
//! [`Verifier::execute`] validates the scenario, resolves its templates, sends
//! exactly one request, and judges the response. Configuration errors return
//! `Err` before any I/O; everything that happens on the wire is reported as a
//! [`Verdict`] instead.
//!
//! No retries are attempted. A timeout applies only when configured.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use contract_probe_core::Bindings;
use contract_probe_core::HttpMethod;
use contract_probe_core::Scenario;
use contract_probe_core::ScenarioError;
use contract_probe_core::Verdict;
use reqwest::Client;
use reqwest::Method;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Everything observed while executing one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Judgement of the response.
    pub verdict: Verdict,
    /// Fully resolved request URL.
    pub url: Url,
    /// HTTP status when a response arrived.
    pub status: Option<u16>,
    /// Raw response text when a response arrived.
    pub body: Option<String>,
    /// Wall-clock time spent on the round trip.
    pub elapsed: Duration,
    /// Variables captured from the response (empty unless passed).
    pub captured: Bindings,
}

/// Errors raised while building a verifier.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
}

/// HTTP contract verifier bound to one service base URL.
///
/// # Invariants
/// - Requests never leave the origin or the path of `base_url`.
#[derive(Debug, Clone)]
pub struct Verifier {
    /// Shared HTTP client.
    client: Client,
    /// Service base URL.
    base_url: Url,
}

impl Verifier {
    /// Builds a verifier with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Client`] when the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, VerifierError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| VerifierError::Client(err.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing HTTP client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
        }
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Computes the request URL for a resolved scenario.
    ///
    /// An empty path targets the base URL itself; otherwise the path is joined
    /// beneath it. Query parameters are form-encoded in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] when the path leaves the base path
    /// or origin, or when it carries a query or fragment.
    pub fn target_url(&self, scenario: &Scenario) -> Result<Url, ScenarioError> {
        let relative = scenario.path.trim_start_matches('/');
        let directory = base_directory(&self.base_url);
        let mut url = if relative.is_empty() {
            self.base_url.clone()
        } else {
            let joined = directory.join(relative).map_err(|err| {
                ScenarioError::invalid(scenario.name.clone(), format!("invalid path: {err}"))
            })?;
            if joined.origin() != self.base_url.origin()
                || !joined.path().starts_with(directory.path())
            {
                return Err(ScenarioError::invalid(
                    scenario.name.clone(),
                    "path must stay under the service base URL",
                ));
            }
            if joined.query().is_some() || joined.fragment().is_some() {
                return Err(ScenarioError::invalid(
                    scenario.name.clone(),
                    "path must not carry a query or fragment",
                ));
            }
            joined
        };
        if !scenario.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in &scenario.query {
                pairs.append_pair(&param.name, &param.value);
            }
        }
        Ok(url)
    }

    /// Executes a scenario that uses no captured variables.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] for configuration problems, before any I/O.
    pub async fn execute(&self, scenario: &Scenario) -> Result<Observation, ScenarioError> {
        self.execute_with(scenario, &Bindings::new()).await
    }

    /// Executes a scenario after resolving its templates against `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] for configuration problems, before any I/O.
    pub async fn execute_with(
        &self,
        scenario: &Scenario,
        bindings: &Bindings,
    ) -> Result<Observation, ScenarioError> {
        scenario.validate()?;
        let resolved = scenario.resolve(bindings)?;
        let url = self.target_url(&resolved)?;
        let mut request = self.client.request(method_for(resolved.method), url.clone());
        if let Some(body) = &resolved.body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                return Ok(Observation {
                    verdict: Verdict::transport(err.to_string()),
                    url,
                    status: None,
                    body: None,
                    elapsed: started.elapsed(),
                    captured: Bindings::new(),
                });
            }
        };
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return Ok(Observation {
                    verdict: Verdict::transport(format!("failed to read response body: {err}")),
                    url,
                    status: Some(status),
                    body: None,
                    elapsed: started.elapsed(),
                    captured: Bindings::new(),
                });
            }
        };
        let elapsed = started.elapsed();
        let evaluation = resolved.evaluate(status, &body);
        Ok(Observation {
            verdict: evaluation.verdict,
            url,
            status: Some(status),
            body: Some(body),
            elapsed,
            captured: evaluation.captured,
        })
    }

    /// Executes a scenario and returns only its verdict.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] for configuration problems, before any I/O.
    pub async fn verify(&self, scenario: &Scenario) -> Result<Verdict, ScenarioError> {
        Ok(self.execute(scenario).await?.verdict)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns `base` with a trailing slash so relative paths join beneath it.
fn base_directory(base: &Url) -> Url {
    let mut directory = base.clone();
    if !directory.path().ends_with('/') {
        let path = format!("{}/", directory.path());
        directory.set_path(&path);
    }
    directory
}

/// Maps a scenario method onto the HTTP client's method type.
const fn method_for(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}
