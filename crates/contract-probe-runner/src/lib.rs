// crates/contract-probe-runner/src/lib.rs
// ============================================================================
// Module: Contract Probe Runner Library
// Description: HTTP verification, suite execution, audit events, and reports.
// Purpose: Execute declarative scenarios against live services.
// Dependencies: contract-probe-core, reqwest, serde, serde_jcs, toml
// ============================================================================

//! ## Overview
//! This crate is the I/O half of the probe. [`Verifier`] performs one HTTP
//! round trip per scenario; [`SuiteRunner`] sequences cases, awaits the
//! before-each hook, threads captured bindings, and produces a
//! [`SuiteReport`]. Run events are emitted through an [`AuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod hook;
pub mod report;
pub mod suite;
pub mod suite_file;
pub mod verifier;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use hook::BeforeEachHook;
pub use hook::HookError;
pub use hook::HookFailurePolicy;
pub use hook::NoopHook;
pub use hook::RequestHook;
pub use report::CaseReport;
pub use report::ReportError;
pub use report::RunStatus;
pub use report::ScenarioReport;
pub use report::ScenarioStatus;
pub use report::SuiteReport;
pub use suite::Case;
pub use suite::Suite;
pub use suite::SuiteError;
pub use suite::SuiteRunner;
pub use suite_file::SuiteFileError;
pub use suite_file::load_suite_file;
pub use verifier::Observation;
pub use verifier::Verifier;
pub use verifier::VerifierError;
