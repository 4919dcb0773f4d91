// crates/contract-probe-runner/src/suite_file.rs
// ============================================================================
// Module: Suite Files
// Description: Load declarative suites from TOML or JSON files.
// Purpose: Let contracts live next to deployments without recompiling.
// Dependencies: serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! Suite files mirror [`Suite`] field for field:
//!
//! ```toml
//! name = "math"
//! service = "math"
//!
//! [[cases]]
//! name = "evaluates a valid expression"
//!
//! [[cases.scenarios]]
//! name = "2*(7-3)"
//! method = "GET"
//! query = [{ name = "expr", value = "2*(7-3)" }]
//! expect = { kind = "exact_value", value = "8" }
//! ```
//!
//! Files are size-limited, must be UTF-8, and are validated on load so a bad
//! file never reaches the network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::suite::Suite;
use crate::suite::SuiteError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum suite file size in bytes.
pub const MAX_SUITE_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a suite file; `.json` files are parsed as JSON,
/// anything else as TOML.
///
/// # Errors
///
/// Returns [`SuiteFileError`] when reading, parsing, or validation fails.
pub fn load_suite_file(path: &Path) -> Result<Suite, SuiteFileError> {
    let bytes =
        fs::read(path).map_err(|err| SuiteFileError::Io(format!("{}: {err}", path.display())))?;
    if bytes.len() > MAX_SUITE_FILE_SIZE {
        return Err(SuiteFileError::TooLarge {
            path: path.display().to_string(),
            limit: MAX_SUITE_FILE_SIZE,
        });
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| SuiteFileError::Parse(format!("{}: suite file must be utf-8", path.display())))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json { parse_suite_json(content) } else { parse_suite_toml(content) }
}

/// Parses and validates a TOML suite.
///
/// # Errors
///
/// Returns [`SuiteFileError`] when parsing or validation fails.
pub fn parse_suite_toml(content: &str) -> Result<Suite, SuiteFileError> {
    let suite: Suite =
        toml::from_str(content).map_err(|err| SuiteFileError::Parse(err.to_string()))?;
    suite.validate()?;
    Ok(suite)
}

/// Parses and validates a JSON suite.
///
/// # Errors
///
/// Returns [`SuiteFileError`] when parsing or validation fails.
pub fn parse_suite_json(content: &str) -> Result<Suite, SuiteFileError> {
    let suite: Suite =
        serde_json::from_str(content).map_err(|err| SuiteFileError::Parse(err.to_string()))?;
    suite.validate()?;
    Ok(suite)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Suite file errors.
#[derive(Debug, Error)]
pub enum SuiteFileError {
    /// Reading the file failed.
    #[error("suite io error: {0}")]
    Io(String),
    /// The file exceeds [`MAX_SUITE_FILE_SIZE`].
    #[error("suite file {path} exceeds size limit ({limit} bytes)")]
    TooLarge {
        /// Offending path.
        path: String,
        /// Maximum size in bytes.
        limit: usize,
    },
    /// TOML or JSON parsing failed.
    #[error("suite parse error: {0}")]
    Parse(String),
    /// The suite parsed but is invalid.
    #[error(transparent)]
    Invalid(#[from] SuiteError),
}
