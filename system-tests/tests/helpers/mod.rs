// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for contract probe system-tests.
// Purpose: Provide service stubs, target selection, and artifact utilities.
// Dependencies: system-tests, contract-probe-runner, contract-probe-services
// ============================================================================

//! ## Overview
//! Shared helpers for contract probe system-tests.
//! Invariants:
//! - Stubs bind loopback ephemeral ports and stop when their handle drops.
//! - Every test writes a summary under its artifact root, even on panic.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod math_stub;
pub mod stub_server;
pub mod targets;
pub mod timeouts;
