// crates/contract-probe-config/src/lib.rs
// ============================================================================
// Module: Contract Probe Configuration Library
// Description: Stage environments and environment-variable parsing.
// Purpose: Map a deployment stage to the base URL of every probed service.
// Dependencies: serde, serde_json, thiserror, toml, url
// ============================================================================

//! ## Overview
//! An [`Environment`] is loaded once per run and never mutated. It maps stage
//! names (`dev`, `prod`, ...) to the base URL of each service under test.
//! TOML is the primary format; the legacy `env.json` layout
//! (`{ "dev": { "mathURL": "..." } }`) is accepted for `.json` files.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod env;
pub mod environment;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ProbeEnv;
pub use env::read_env_strict;
pub use environment::ClientConfig;
pub use environment::ConfigError;
pub use environment::Environment;
pub use environment::Stage;
pub use environment::normalize_service_key;
