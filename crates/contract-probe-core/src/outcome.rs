// crates/contract-probe-core/src/outcome.rs
// ============================================================================
// Module: Expected Outcomes
// Description: Declarative expectations for response bodies.
// Purpose: Unify exact, substring, subset, and field checks in one variant.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ExpectedOutcome`] is the single expectation attached to a scenario.
//! Textual outcomes read the raw body; structural outcomes parse it as JSON
//! first and fail with a parse verdict when that is impossible.
//!
//! Invariants:
//! - [`ExpectedOutcome::ShapeMatch`] is a subset match: extra keys in the
//!   response are allowed, listed keys must be deep-equal.
//! - [`ExpectedOutcome::AllOf`] must be non-empty; an empty conjunction would
//!   pass silently and is rejected by [`ExpectedOutcome::validate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::bindings::Bindings;
use crate::verdict::Verdict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of body characters echoed into diagnostics.
const PREVIEW_CHARS: usize = 200;

// ============================================================================
// SECTION: Field Paths
// ============================================================================

/// Address of a value inside a JSON body.
///
/// A path starting with `/` (or the empty path) is an RFC 6901 JSON pointer.
/// Anything else is a bare top-level key such as `status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Creates a field path from a bare key or JSON pointer.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for a non-empty path made only of whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.0.is_empty() && self.0.trim().is_empty()
    }

    /// Returns the equivalent JSON pointer.
    #[must_use]
    pub fn pointer(&self) -> String {
        if self.0.is_empty() || self.0.starts_with('/') {
            self.0.clone()
        } else {
            format!("/{}", self.0.replace('~', "~0").replace('/', "~1"))
        }
    }

    /// Resolves the path against a JSON value.
    #[must_use]
    pub fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        value.pointer(&self.pointer())
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Expected Outcome
// ============================================================================

/// The expectation a response must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// Strict equality. A JSON string compares against the raw body text;
    /// any other JSON value compares against the parsed body.
    ExactValue {
        /// Expected value.
        value: Value,
    },
    /// The raw body text contains `text`.
    ContainsSubstring {
        /// Required substring.
        text: String,
    },
    /// Every key of `partial` is present in the body with an equal value.
    ShapeMatch {
        /// Partial object (or array of partial objects).
        partial: Value,
    },
    /// The addressed field equals `value`.
    FieldEquals {
        /// Field to read.
        field: FieldPath,
        /// Expected value.
        value: Value,
    },
    /// The addressed string field contains `text`.
    FieldContains {
        /// Field to read.
        field: FieldPath,
        /// Required substring.
        text: String,
    },
    /// The addressed array or string has exactly `length` elements/characters.
    LengthEquals {
        /// Field to read.
        field: FieldPath,
        /// Expected length.
        length: usize,
    },
    /// Every nested outcome holds for the same response.
    AllOf {
        /// Nested outcomes, evaluated in order.
        outcomes: Vec<ExpectedOutcome>,
    },
}

impl ExpectedOutcome {
    /// Exact raw-text equality.
    #[must_use]
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::ExactValue {
            value: Value::String(text.into()),
        }
    }

    /// Exact equality against the parsed JSON body.
    #[must_use]
    pub const fn exact_json(value: Value) -> Self {
        Self::ExactValue {
            value,
        }
    }

    /// Raw-text substring check.
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::ContainsSubstring {
            text: text.into(),
        }
    }

    /// Subset match against the parsed JSON body.
    #[must_use]
    pub const fn shape(partial: Value) -> Self {
        Self::ShapeMatch {
            partial,
        }
    }

    /// Field equality against the parsed JSON body.
    #[must_use]
    pub fn field_equals(field: impl Into<FieldPath>, value: Value) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value,
        }
    }

    /// Substring check on a string field of the parsed JSON body.
    #[must_use]
    pub fn field_contains(field: impl Into<FieldPath>, text: impl Into<String>) -> Self {
        Self::FieldContains {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Length check on an array or string field of the parsed JSON body.
    #[must_use]
    pub fn length_equals(field: impl Into<FieldPath>, length: usize) -> Self {
        Self::LengthEquals {
            field: field.into(),
            length,
        }
    }

    /// Conjunction of outcomes.
    #[must_use]
    pub const fn all_of(outcomes: Vec<Self>) -> Self {
        Self::AllOf {
            outcomes,
        }
    }

    /// Returns a stable label for the variant.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ExactValue {
                ..
            } => "exact_value",
            Self::ContainsSubstring {
                ..
            } => "contains_substring",
            Self::ShapeMatch {
                ..
            } => "shape_match",
            Self::FieldEquals {
                ..
            } => "field_equals",
            Self::FieldContains {
                ..
            } => "field_contains",
            Self::LengthEquals {
                ..
            } => "length_equals",
            Self::AllOf {
                ..
            } => "all_of",
        }
    }

    /// Returns true when evaluation needs the body parsed as JSON.
    #[must_use]
    pub fn requires_json(&self) -> bool {
        match self {
            Self::ExactValue {
                value,
            } => !value.is_string(),
            Self::ContainsSubstring {
                ..
            } => false,
            Self::ShapeMatch {
                ..
            }
            | Self::FieldEquals {
                ..
            }
            | Self::FieldContains {
                ..
            }
            | Self::LengthEquals {
                ..
            } => true,
            Self::AllOf {
                outcomes,
            } => outcomes.iter().any(Self::requires_json),
        }
    }

    /// Checks that the outcome is well formed.
    ///
    /// # Errors
    ///
    /// Returns a reason when the outcome could never be evaluated meaningfully.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::ExactValue {
                ..
            }
            | Self::ContainsSubstring {
                ..
            } => Ok(()),
            Self::ShapeMatch {
                partial,
            } => {
                if partial.is_object() || partial.is_array() {
                    Ok(())
                } else {
                    Err("shape_match partial must be an object or an array".to_string())
                }
            }
            Self::FieldEquals {
                field,
                ..
            }
            | Self::FieldContains {
                field,
                ..
            }
            | Self::LengthEquals {
                field,
                ..
            } => {
                if field.is_blank() {
                    Err(format!("{} field path must not be blank", self.label()))
                } else {
                    Ok(())
                }
            }
            Self::AllOf {
                outcomes,
            } => {
                if outcomes.is_empty() {
                    return Err("all_of requires at least one outcome".to_string());
                }
                outcomes.iter().try_for_each(Self::validate)
            }
        }
    }

    /// Judges a raw response body.
    #[must_use]
    pub fn evaluate(&self, body: &str) -> Verdict {
        let parsed = if self.requires_json() {
            match serde_json::from_str::<Value>(body) {
                Ok(value) => Some(value),
                Err(err) => return Verdict::parse(format!("{err}; body: `{}`", preview(body))),
            }
        } else {
            None
        };
        match self.check(body, parsed.as_ref()) {
            Ok(()) => Verdict::Pass,
            Err(reason) => Verdict::assertion(reason),
        }
    }

    /// Substitutes `{{name}}` templates in every string the outcome compares.
    ///
    /// # Errors
    ///
    /// Returns the name of the first unbound variable.
    pub fn resolve(&self, bindings: &Bindings) -> Result<Self, String> {
        Ok(match self {
            Self::ExactValue {
                value,
            } => Self::ExactValue {
                value: bindings.substitute_value(value)?,
            },
            Self::ContainsSubstring {
                text,
            } => Self::ContainsSubstring {
                text: bindings.substitute(text)?,
            },
            Self::ShapeMatch {
                partial,
            } => Self::ShapeMatch {
                partial: bindings.substitute_value(partial)?,
            },
            Self::FieldEquals {
                field,
                value,
            } => Self::FieldEquals {
                field: field.clone(),
                value: bindings.substitute_value(value)?,
            },
            Self::FieldContains {
                field,
                text,
            } => Self::FieldContains {
                field: field.clone(),
                text: bindings.substitute(text)?,
            },
            Self::LengthEquals {
                ..
            } => self.clone(),
            Self::AllOf {
                outcomes,
            } => Self::AllOf {
                outcomes: outcomes
                    .iter()
                    .map(|outcome| outcome.resolve(bindings))
                    .collect::<Result<_, _>>()?,
            },
        })
    }

    /// Applies the expectation to the raw text and (when parsed) JSON body.
    fn check(&self, text: &str, json: Option<&Value>) -> Result<(), String> {
        match self {
            Self::ExactValue {
                value: Value::String(expected),
            } => {
                if text == expected {
                    Ok(())
                } else {
                    Err(format!("expected exact text `{expected}`, got `{}`", preview(text)))
                }
            }
            Self::ExactValue {
                value,
            } => {
                let actual = parsed(json)?;
                if actual == value {
                    Ok(())
                } else {
                    Err(format!("expected JSON {value}, got {actual}"))
                }
            }
            Self::ContainsSubstring {
                text: needle,
            } => {
                if text.contains(needle.as_str()) {
                    Ok(())
                } else {
                    Err(format!("expected body to contain `{needle}`, got `{}`", preview(text)))
                }
            }
            Self::ShapeMatch {
                partial,
            } => shape_matches(partial, parsed(json)?),
            Self::FieldEquals {
                field,
                value,
            } => {
                let actual = field_value(field, parsed(json)?)?;
                if actual == value {
                    Ok(())
                } else {
                    Err(format!("field `{field}`: expected {value}, got {actual}"))
                }
            }
            Self::FieldContains {
                field,
                text: needle,
            } => {
                let actual = field_value(field, parsed(json)?)?;
                let Some(haystack) = actual.as_str() else {
                    return Err(format!("field `{field}` is not a string: {actual}"));
                };
                if haystack.contains(needle.as_str()) {
                    Ok(())
                } else {
                    Err(format!("field `{field}`: expected to contain `{needle}`, got `{haystack}`"))
                }
            }
            Self::LengthEquals {
                field,
                length,
            } => {
                let actual = field_value(field, parsed(json)?)?;
                let found = match actual {
                    Value::Array(items) => items.len(),
                    Value::String(value) => value.chars().count(),
                    other => {
                        return Err(format!(
                            "field `{field}` has no length (expected array or string): {other}"
                        ));
                    }
                };
                if found == *length {
                    Ok(())
                } else {
                    Err(format!("field `{field}`: expected length {length}, got {found}"))
                }
            }
            Self::AllOf {
                outcomes,
            } => outcomes.iter().try_for_each(|outcome| outcome.check(text, json)),
        }
    }
}

// ============================================================================
// SECTION: Shape Matching
// ============================================================================

/// Checks that `partial` is a subset of `actual`.
///
/// Objects: every key of `partial` must exist in `actual` with a deep-equal
/// value. Arrays: same length, element-wise shape match. Scalars: equality.
///
/// # Errors
///
/// Returns a diagnostic naming the first mismatching location.
pub fn shape_matches(partial: &Value, actual: &Value) -> Result<(), String> {
    shape_at(partial, actual, "")
}

/// Recursive worker for [`shape_matches`] tracking the pointer location.
fn shape_at(partial: &Value, actual: &Value, path: &str) -> Result<(), String> {
    match (partial, actual) {
        (Value::Object(expected), Value::Object(found)) => {
            for (key, value) in expected {
                let here = format!("{path}/{key}");
                match found.get(key) {
                    None => return Err(format!("missing key `{here}`")),
                    Some(actual_value) if actual_value != value => {
                        return Err(format!("key `{here}`: expected {value}, got {actual_value}"));
                    }
                    Some(_) => {}
                }
            }
            Ok(())
        }
        (Value::Array(expected), Value::Array(found)) => {
            if expected.len() != found.len() {
                return Err(format!(
                    "array at `{}`: expected {} elements, got {}",
                    display_path(path),
                    expected.len(),
                    found.len()
                ));
            }
            for (index, (want, got)) in expected.iter().zip(found).enumerate() {
                shape_at(want, got, &format!("{path}/{index}"))?;
            }
            Ok(())
        }
        (Value::Object(_) | Value::Array(_), other) => Err(format!(
            "expected {} at `{}`, got {other}",
            type_name(partial),
            display_path(path)
        )),
        (expected, found) => {
            if expected == found {
                Ok(())
            } else {
                Err(format!("at `{}`: expected {expected}, got {found}", display_path(path)))
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the parsed body or an internal error when it was not parsed.
fn parsed(json: Option<&Value>) -> Result<&Value, String> {
    json.ok_or_else(|| "response body was not parsed as JSON".to_string())
}

/// Looks up a field, failing when it is absent.
fn field_value<'a>(field: &FieldPath, body: &'a Value) -> Result<&'a Value, String> {
    field.lookup(body).ok_or_else(|| format!("field `{field}` missing from response"))
}

/// Renders the root pointer as `/` for readability.
fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

/// Names the JSON type of a value for diagnostics.
const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truncates a body for inclusion in a diagnostic.
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
