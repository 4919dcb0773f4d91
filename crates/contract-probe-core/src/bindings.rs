// crates/contract-probe-core/src/bindings.rs
// ============================================================================
// Module: Scenario Bindings
// Description: Variables captured from responses and `{{name}}` templates.
// Purpose: Let later scenarios address entities created by earlier ones.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Remote ids are opaque: the harness never interprets them, it only copies
//! them from one response into a later request. [`Bindings`] holds those
//! copies for the duration of a case and substitutes them into templates.
//!
//! Template syntax is `{{name}}` with optional inner whitespace. An opening
//! `{{` without a closing `}}` is left untouched.
//!
//! Path templates are rendered with [`Bindings::substitute_path`], which
//! percent-encodes each value as exactly one path segment so an id can never
//! add segments, a query, or a fragment to the request.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::outcome::FieldPath;

/// Template opening delimiter.
const TEMPLATE_OPEN: &str = "{{";
/// Template closing delimiter.
const TEMPLATE_CLOSE: &str = "}}";
/// Throwaway URL whose path encoder renders single segments.
const SEGMENT_SCRATCH_URL: &str = "http://segment.invalid/";

/// Failure while rendering a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplateError {
    /// The template names a variable that is not bound.
    Unbound(String),
    /// The bound value cannot stand as one path segment (`.` or `..`).
    InvalidSegment {
        /// Variable name.
        name: String,
        /// Offending value.
        value: String,
    },
}

/// Named string values captured during a case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    /// Variable values keyed by name.
    values: BTreeMap<String, String>,
}

impl Bindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Merges `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Replaces every `{{name}}` in `template`.
    ///
    /// # Errors
    ///
    /// Returns the name of the first unbound variable.
    pub fn substitute(&self, template: &str) -> Result<String, String> {
        self.render(template, |name| name.to_string(), |_, value| Ok(value.to_string()))
    }

    /// Replaces every `{{name}}` in a path template with the value encoded as
    /// a single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`PathTemplateError::Unbound`] for the first unbound variable
    /// and [`PathTemplateError::InvalidSegment`] for `.` or `..` values.
    pub fn substitute_path(&self, template: &str) -> Result<String, PathTemplateError> {
        self.render(
            template,
            |name| PathTemplateError::Unbound(name.to_string()),
            |name, value| {
                encode_path_segment(value).ok_or_else(|| PathTemplateError::InvalidSegment {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            },
        )
    }

    /// Walks `template`, emitting literal text as-is and each bound value
    /// through `emit`.
    fn render<E>(
        &self,
        template: &str,
        unbound: impl Fn(&str) -> E,
        emit: impl Fn(&str, &str) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find(TEMPLATE_OPEN) {
            let after = &rest[start + TEMPLATE_OPEN.len()..];
            let Some(end) = after.find(TEMPLATE_CLOSE) else {
                break;
            };
            out.push_str(&rest[..start]);
            let name = after[..end].trim();
            let value =
                self.values.get(name).map(String::as_str).ok_or_else(|| unbound(name))?;
            out.push_str(&emit(name, value)?);
            rest = &after[end + TEMPLATE_CLOSE.len()..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Replaces templates in every string leaf of a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the name of the first unbound variable.
    pub fn substitute_value(&self, value: &Value) -> Result<Value, String> {
        Ok(match value {
            Value::String(text) => Value::String(self.substitute(text)?),
            Value::Array(items) => Value::Array(
                items.iter().map(|item| self.substitute_value(item)).collect::<Result<_, _>>()?,
            ),
            Value::Object(fields) => {
                let mut out = Map::with_capacity(fields.len());
                for (key, field) in fields {
                    out.insert(key.clone(), self.substitute_value(field)?);
                }
                Value::Object(out)
            }
            other => other.clone(),
        })
    }

    /// Reads each capture from `body` and binds it.
    ///
    /// Strings are bound as-is; numbers and booleans by their JSON text.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic when a field is missing, empty, or not a scalar.
    pub fn capture(
        &mut self,
        captures: &BTreeMap<String, FieldPath>,
        body: &Value,
    ) -> Result<(), String> {
        for (name, field) in captures {
            let found = field
                .lookup(body)
                .ok_or_else(|| format!("capture `{name}`: field `{field}` missing from response"))?;
            let text = match found {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                other => {
                    return Err(format!("capture `{name}`: field `{field}` is not a scalar: {other}"));
                }
            };
            if text.is_empty() {
                return Err(format!("capture `{name}`: field `{field}` is empty"));
            }
            self.values.insert(name.clone(), text);
        }
        Ok(())
    }
}

/// Returns `template` with every complete `{{name}}` span removed.
#[must_use]
pub fn template_literals(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(TEMPLATE_OPEN) {
        let after = &rest[start + TEMPLATE_OPEN.len()..];
        let Some(end) = after.find(TEMPLATE_CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &after[end + TEMPLATE_CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

/// Percent-encodes `value` as one path segment; `None` for `.` and `..`.
fn encode_path_segment(value: &str) -> Option<String> {
    if matches!(value, "." | "..") {
        return None;
    }
    let mut scratch = Url::parse(SEGMENT_SCRATCH_URL).ok()?;
    scratch.path_segments_mut().ok()?.pop_if_empty().push(value);
    Some(scratch.path().trim_start_matches('/').to_string())
}

/// Returns true for names usable as capture variables (`[A-Za-z0-9_]+`).
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
