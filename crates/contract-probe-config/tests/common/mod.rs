// crates/contract-probe-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for environment validation tests.
// Purpose: Reduce duplication across integration tests for contract-probe-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use contract_probe_config::ConfigError;
use tempfile::TempDir;

/// Minimal valid TOML environment with `dev` and `prod` stages.
pub const TWO_STAGE_TOML: &str = r#"
[client]
timeout_secs = 15

[stages.dev]
math = "http://127.0.0.1:3000/"
tasks = "http://127.0.0.1:3001/tasks"

[stages.prod]
math = "https://math.example.com/v1"
tasks = "https://tasks.example.com/tasks"
"#;

/// Legacy `env.json` layout.
pub const LEGACY_JSON: &str = r#"{
  "dev":  { "mathURL": "http://localhost:3000/", "tasksURL": "http://localhost:3001/tasks" },
  "prod": { "mathURL": "https://math.example.com/", "tasksURL": "https://tasks.example.com/tasks" }
}"#;

/// Writes `content` to `name` inside a fresh temp dir.
pub fn write_temp(name: &str, content: &[u8]) -> Result<(TempDir, PathBuf), std::io::Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok((dir, path))
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid environment".to_string()),
    }
}
