// crates/contract-probe-core/src/scenario.rs
// ============================================================================
// Module: Scenarios
// Description: Declarative request/expectation pairs.
// Purpose: Define, validate, resolve, and judge a single contract check.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Scenario`] names one HTTP request relative to a service base URL and
//! the single [`ExpectedOutcome`] its response must satisfy. Scenarios are
//! validated before execution so configuration mistakes never reach the
//! network, and resolved against [`Bindings`] so ids captured earlier in a
//! case can be addressed later.
//!
//! Invariants:
//! - Exactly one expected outcome per scenario (a required field).
//! - Only POST and PUT carry a body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::bindings::Bindings;
use crate::bindings::PathTemplateError;
use crate::bindings::is_valid_variable_name;
use crate::bindings::template_literals;
use crate::error::ScenarioError;
use crate::outcome::ExpectedOutcome;
use crate::outcome::FieldPath;
use crate::outcome::preview;
use crate::verdict::Verdict;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// HTTP methods a scenario may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns true when requests with this method carry a JSON body.
    #[must_use]
    pub const fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One query-string parameter, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value (URL-encoded at send time).
    pub value: String,
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// A single declarative contract check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Human-readable name used in reports.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the service base URL; empty targets the base itself.
    #[serde(default)]
    pub path: String,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
    /// JSON request body (POST/PUT only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Optional HTTP status the response must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_status: Option<u16>,
    /// The expectation the response must satisfy.
    pub expect: ExpectedOutcome,
    /// Variables to capture from the JSON body once the scenario passes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub captures: BTreeMap<String, FieldPath>,
}

/// Verdict plus any values captured from the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Outcome of the check.
    pub verdict: Verdict,
    /// Captured variables; empty unless the verdict passed.
    pub captured: Bindings,
}

impl Evaluation {
    /// Wraps a verdict with no captures.
    fn without_captures(verdict: Verdict) -> Self {
        Self {
            verdict,
            captured: Bindings::new(),
        }
    }
}

impl Scenario {
    /// Creates a scenario with no query, body, status, or captures.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
        expect: ExpectedOutcome,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            expect_status: None,
            expect,
            captures: BTreeMap::new(),
        }
    }

    /// Shorthand for a `GET` scenario.
    #[must_use]
    pub fn get(name: impl Into<String>, path: impl Into<String>, expect: ExpectedOutcome) -> Self {
        Self::new(name, HttpMethod::Get, path, expect)
    }

    /// Shorthand for a `POST` scenario with a JSON body.
    #[must_use]
    pub fn post(
        name: impl Into<String>,
        path: impl Into<String>,
        body: Value,
        expect: ExpectedOutcome,
    ) -> Self {
        Self::new(name, HttpMethod::Post, path, expect).with_body(body)
    }

    /// Shorthand for a `PUT` scenario with a JSON body.
    #[must_use]
    pub fn put(
        name: impl Into<String>,
        path: impl Into<String>,
        body: Value,
        expect: ExpectedOutcome,
    ) -> Self {
        Self::new(name, HttpMethod::Put, path, expect).with_body(body)
    }

    /// Shorthand for a `DELETE` scenario.
    #[must_use]
    pub fn delete(
        name: impl Into<String>,
        path: impl Into<String>,
        expect: ExpectedOutcome,
    ) -> Self {
        Self::new(name, HttpMethod::Delete, path, expect)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(QueryParam {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Requires a specific HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.expect_status = Some(status);
        self
    }

    /// Captures `field` from the JSON body into variable `name`.
    #[must_use]
    pub fn capture(mut self, name: impl Into<String>, field: impl Into<FieldPath>) -> Self {
        self.captures.insert(name.into(), field.into());
        self
    }

    /// Checks the scenario for configuration errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |reason: String| ScenarioError::invalid(self.name.clone(), reason);
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if self.body.is_some() && !self.method.allows_body() {
            return Err(invalid(format!("{} requests must not carry a body", self.method)));
        }
        let literal_path = template_literals(&self.path);
        if literal_path.chars().any(char::is_whitespace) {
            return Err(invalid("path must not contain whitespace".to_string()));
        }
        if literal_path.contains(['?', '#']) {
            return Err(invalid("path must not carry a query or fragment".to_string()));
        }
        if self.query.iter().any(|param| param.name.trim().is_empty()) {
            return Err(invalid("query parameter names must not be empty".to_string()));
        }
        if let Some(status) = self.expect_status
            && !(100..=599).contains(&status)
        {
            return Err(invalid(format!("expect_status {status} is not an HTTP status")));
        }
        self.expect.validate().map_err(invalid)?;
        for (name, field) in &self.captures {
            if !is_valid_variable_name(name) {
                return Err(invalid(format!(
                    "capture name `{name}` must use only letters, digits, or underscores"
                )));
            }
            if field.is_blank() {
                return Err(invalid(format!("capture `{name}` field path must not be blank")));
            }
        }
        Ok(())
    }

    /// Substitutes `{{name}}` templates from `bindings`.
    ///
    /// Path, query values, body string leaves, and expected values are
    /// resolved; field paths and capture definitions are not. Values placed
    /// in the path are percent-encoded as single segments.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnboundVariable`] for the first unknown name
    /// and [`ScenarioError::Invalid`] when a path value is `.` or `..`.
    pub fn resolve(&self, bindings: &Bindings) -> Result<Self, ScenarioError> {
        let unbound = |name: String| ScenarioError::UnboundVariable {
            scenario: self.name.clone(),
            name,
        };
        let path = bindings.substitute_path(&self.path).map_err(|err| match err {
            PathTemplateError::Unbound(name) => unbound(name),
            PathTemplateError::InvalidSegment {
                name,
                value,
            } => ScenarioError::invalid(
                self.name.clone(),
                format!("variable `{name}` value `{value}` is not a valid path segment"),
            ),
        })?;
        let query = self
            .query
            .iter()
            .map(|param| -> Result<QueryParam, ScenarioError> {
                Ok(QueryParam {
                    name: param.name.clone(),
                    value: bindings.substitute(&param.value).map_err(unbound)?,
                })
            })
            .collect::<Result<Vec<_>, ScenarioError>>()?;
        let body = match &self.body {
            Some(body) => Some(bindings.substitute_value(body).map_err(unbound)?),
            None => None,
        };
        let expect = self.expect.resolve(bindings).map_err(unbound)?;
        Ok(Self {
            name: self.name.clone(),
            method: self.method,
            path,
            query,
            body,
            expect_status: self.expect_status,
            expect,
            captures: self.captures.clone(),
        })
    }

    /// Judges a received response.
    ///
    /// The status check runs first, then the expected outcome, then captures
    /// (only when everything else passed).
    #[must_use]
    pub fn evaluate(&self, status: u16, body: &str) -> Evaluation {
        if let Some(expected) = self.expect_status
            && expected != status
        {
            return Evaluation::without_captures(Verdict::assertion(format!(
                "expected status {expected}, got {status}; body: `{}`",
                preview(body)
            )));
        }
        let verdict = self.expect.evaluate(body);
        if !verdict.is_pass() || self.captures.is_empty() {
            return Evaluation::without_captures(verdict);
        }
        let parsed: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(err) => {
                return Evaluation::without_captures(Verdict::parse(format!(
                    "captures need a JSON body: {err}"
                )));
            }
        };
        let mut captured = Bindings::new();
        match captured.capture(&self.captures, &parsed) {
            Ok(()) => Evaluation {
                verdict: Verdict::Pass,
                captured,
            },
            Err(reason) => Evaluation::without_captures(Verdict::assertion(reason)),
        }
    }
}
