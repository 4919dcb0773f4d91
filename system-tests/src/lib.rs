// system-tests/src/lib.rs
// ============================================================================
// Module: Contract Probe System Tests Library
// Description: Shared configuration for contract probe system tests.
// Purpose: Provide common settings for the system-test binaries.
// Dependencies: contract-probe-config, url
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the contract probe
//! system-test binaries in `system-tests/tests`. By default every test runs
//! against in-process stub services; setting a target URL variable points the
//! contract tests at a live deployment instead.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
