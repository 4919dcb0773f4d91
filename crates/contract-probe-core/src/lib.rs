// crates/contract-probe-core/src/lib.rs
// ============================================================================
// Module: Contract Probe Core Library
// Description: Scenario model and response evaluation for API contract checks.
// Purpose: Describe request/expectation pairs and judge responses without I/O.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! The core crate defines what a contract check *is*: a [`Scenario`] naming a
//! request and exactly one [`ExpectedOutcome`], the [`Verdict`] produced when
//! a response is judged, and the [`Bindings`] that let later scenarios reuse
//! values (such as server-assigned ids) captured from earlier responses.
//!
//! Nothing here touches the network. Transport lives in
//! `contract-probe-runner`; this crate only validates scenarios and evaluates
//! response bodies, which keeps every matching rule unit-testable.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bindings;
pub mod error;
pub mod outcome;
pub mod scenario;
pub mod verdict;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use bindings::Bindings;
pub use bindings::PathTemplateError;
pub use error::ScenarioError;
pub use outcome::ExpectedOutcome;
pub use outcome::FieldPath;
pub use scenario::Evaluation;
pub use scenario::HttpMethod;
pub use scenario::QueryParam;
pub use scenario::Scenario;
pub use verdict::Failure;
pub use verdict::FailureKind;
pub use verdict::Verdict;
