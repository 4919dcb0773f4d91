// crates/contract-probe-config/src/environment.rs
// ============================================================================
// Module: Stage Environment
// Description: Stage → service base URL mapping, loading, and validation.
// Purpose: Provide strict, fail-closed environment parsing with hard limits.
// Dependencies: serde, serde_json, thiserror, toml, url
// ============================================================================

//! ## Overview
//! The environment file is read once at process start. Both formats collapse
//! into the same validated [`Environment`]:
//!
//! ```toml
//! [client]
//! timeout_secs = 30
//!
//! [stages.dev]
//! math = "http://localhost:3000/"
//! tasks = "http://localhost:3001/tasks"
//! ```
//!
//! Service keys are normalized with [`normalize_service_key`] so the legacy
//! JSON keys `mathURL`/`tasksURL` address the same services as `math`/`tasks`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::env::ProbeEnv;
use crate::env::read_env_nonempty;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default environment filename when no path is specified.
const DEFAULT_ENV_FILE_NAME: &str = "contract-probe.toml";
/// Maximum environment file size in bytes.
pub(crate) const MAX_ENV_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Suffixes stripped from legacy service keys, longest first.
const SERVICE_KEY_SUFFIXES: &[&str] = &["_url", "URL", "Url"];

// ============================================================================
// SECTION: Raw File Model
// ============================================================================

/// HTTP client settings shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Optional per-request timeout; the transport default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// TOML layout of the environment file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlEnvironment {
    /// Client settings.
    #[serde(default)]
    client: ClientConfig,
    /// Stage tables keyed by stage name.
    #[serde(default)]
    stages: BTreeMap<String, BTreeMap<String, String>>,
}

// ============================================================================
// SECTION: Validated Model
// ============================================================================

/// One deployment stage and its service base URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Stage name.
    name: String,
    /// Base URL per normalized service key.
    services: BTreeMap<String, Url>,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates `(service, base URL)` pairs in service order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.services.iter().map(|(name, url)| (name.as_str(), url))
    }

    /// Returns the base URL for `service` (normalized before lookup).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownService`] when the stage lacks the service.
    pub fn service_url(&self, service: &str) -> Result<&Url, ConfigError> {
        let key = normalize_service_key(service);
        self.services.get(&key).ok_or_else(|| ConfigError::UnknownService {
            stage: self.name.clone(),
            service: key,
        })
    }
}

/// Immutable, validated stage environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Client settings.
    client: ClientConfig,
    /// Stages keyed by name.
    stages: BTreeMap<String, Stage>,
    /// File the environment was loaded from, when loaded from disk.
    source: Option<PathBuf>,
}

impl Environment {
    /// Loads the environment from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then `CONTRACT_PROBE_ENV`, then
    /// `contract-probe.toml`. Files ending in `.json` use the legacy layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_ENV_FILE_SIZE {
            return Err(ConfigError::Invalid("environment file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("environment file must be utf-8".to_string()))?;
        let is_json = resolved
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut environment =
            if is_json { Self::from_json_str(content)? } else { Self::from_toml_str(content)? };
        environment.source = Some(resolved);
        Ok(environment)
    }

    /// Parses and validates the TOML layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: TomlEnvironment =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::from_parts(raw.client, raw.stages)
    }

    /// Parses and validates the legacy JSON layout (`{ stage: { key: url } }`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let stages: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::from_parts(ClientConfig::default(), stages)
    }

    /// Validates raw stage tables into an environment.
    fn from_parts(
        client: ClientConfig,
        raw_stages: BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        if client.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "client.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if raw_stages.is_empty() {
            return Err(ConfigError::Invalid("at least one stage must be defined".to_string()));
        }
        let mut stages = BTreeMap::new();
        for (name, raw_services) in raw_stages {
            let stage = build_stage(&name, raw_services)?;
            stages.insert(name, stage);
        }
        Ok(Self {
            client,
            stages,
            source: None,
        })
    }

    /// Returns client settings.
    #[must_use]
    pub const fn client(&self) -> &ClientConfig {
        &self.client
    }

    /// Returns the file this environment came from, when loaded from disk.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Iterates stages in name order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.values()
    }

    /// Returns the named stage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStage`] listing the known stages.
    pub fn stage(&self, name: &str) -> Result<&Stage, ConfigError> {
        self.stages.get(name.trim()).ok_or_else(|| ConfigError::UnknownStage {
            stage: name.to_string(),
            known: self.stages.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    /// Selects a stage from an explicit name or the `STAGE` variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when no stage is selected or it is unknown.
    pub fn select_stage(&self, explicit: Option<&str>) -> Result<&Stage, ConfigError> {
        let from_env =
            read_env_nonempty(ProbeEnv::Stage.as_str()).map_err(ConfigError::Invalid)?;
        let name = resolve_stage_name(explicit, from_env)?;
        self.stage(&name)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Environment loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading the environment file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The selected stage is not defined.
    #[error("unknown stage `{stage}` (known: {known})")]
    UnknownStage {
        /// Requested stage.
        stage: String,
        /// Comma-separated defined stages.
        known: String,
    },
    /// The stage has no base URL for the service.
    #[error("stage `{stage}` has no `{service}` service")]
    UnknownService {
        /// Stage name.
        stage: String,
        /// Normalized service key.
        service: String,
    },
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Normalizes a service key: strips a trailing `URL`/`Url`/`_url` and lowercases.
///
/// `mathURL`, `math_url`, and `Math` all normalize to `math`.
#[must_use]
pub fn normalize_service_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let stem = SERVICE_KEY_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix).filter(|stem| !stem.is_empty()))
        .unwrap_or(trimmed);
    stem.to_ascii_lowercase()
}

/// Picks the stage name from an explicit value or the environment value.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when neither source yields a name.
pub fn resolve_stage_name(
    explicit: Option<&str>,
    from_env: Option<String>,
) -> Result<String, ConfigError> {
    if let Some(name) = explicit {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("stage must not be empty".to_string()));
        }
        return Ok(trimmed.to_string());
    }
    from_env.map(|name| name.trim().to_string()).ok_or_else(|| {
        ConfigError::Invalid(format!(
            "no stage selected: pass --stage or set {}",
            ProbeEnv::Stage.as_str()
        ))
    })
}

/// Validates one stage table.
fn build_stage(name: &str, raw_services: BTreeMap<String, String>) -> Result<Stage, ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::Invalid("stage names must not be empty".to_string()));
    }
    if raw_services.is_empty() {
        return Err(ConfigError::Invalid(format!("stage `{name}` defines no services")));
    }
    let mut services = BTreeMap::new();
    for (raw_key, raw_url) in raw_services {
        let key = normalize_service_key(&raw_key);
        if key.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "stage `{name}` has an empty service name"
            )));
        }
        let url = parse_base_url(name, &key, &raw_url)?;
        if services.insert(key.clone(), url).is_some() {
            return Err(ConfigError::Invalid(format!(
                "stage `{name}` defines service `{key}` more than once"
            )));
        }
    }
    Ok(Stage {
        name: name.to_string(),
        services,
    })
}

/// Parses and checks a service base URL.
fn parse_base_url(stage: &str, service: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| {
        ConfigError::Invalid(format!("stages.{stage}.{service}: invalid url `{raw}`: {err}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "stages.{stage}.{service}: url must use http or https"
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!(
            "stages.{stage}.{service}: url must include a host"
        )));
    }
    if url.fragment().is_some() {
        return Err(ConfigError::Invalid(format!(
            "stages.{stage}.{service}: url must not include a fragment"
        )));
    }
    Ok(url)
}

/// Resolves the environment path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) =
        read_env_nonempty(ProbeEnv::ConfigPath.as_str()).map_err(ConfigError::Invalid)?
    {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("environment path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_ENV_FILE_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("environment path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("environment path component too long".to_string()));
        }
    }
    Ok(())
}
