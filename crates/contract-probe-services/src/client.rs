// crates/contract-probe-services/src/client.rs
// ============================================================================
// Module: Service Client
// Description: Thin HTTP client shared by the typed service clients.
// Purpose: Send one request relative to a base URL and return raw text.
// Dependencies: reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! [`ServiceClient`] appends path segments to a base URL, so opaque ids are
//! always percent-encoded as a single segment. Responses are read as text;
//! callers decide whether the body must be JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Typed client failures.
///
/// # Invariants
/// - `Transport` and `Parse` render with the same prefixes as verdicts.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Build(String),
    /// The request URL could not be built.
    #[error("invalid url: {0}")]
    Url(String),
    /// Connection or body read failure.
    #[error("network error: {0}")]
    Transport(String),
    /// The body was expected to be JSON of a given shape and was not.
    #[error("invalid JSON: {0}")]
    Parse(String),
}

/// Status and raw text of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl RawResponse {
    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] when the body does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|err| ClientError::Parse(err.to_string()))
    }
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Shared HTTP client.
    client: Client,
    /// Service base URL.
    base_url: Url,
}

impl ServiceClient {
    /// Builds a client with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| ClientError::Build(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
        })
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL for `segments` beneath the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Url`] when the base URL cannot take segments.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on URL or transport failure.
    pub async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<RawResponse, ClientError> {
        let mut url = self.url_for(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response =
            request.send().await.map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| {
            ClientError::Transport(format!("failed to read response body: {err}"))
        })?;
        Ok(RawResponse {
            status,
            body,
        })
    }
}

/// Body type for requests that carry none.
pub type NoBody = ();
