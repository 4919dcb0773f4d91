// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for contract probe system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: contract-probe-config, url
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! a small typed structure for reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use contract_probe_config::read_env_strict;
pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
