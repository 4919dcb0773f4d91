// crates/contract-probe-services/src/lib.rs
// ============================================================================
// Module: Contract Probe Services Library
// Description: Typed clients and contract suites for the probed services.
// Purpose: Encode the math and tasks contracts once, for suites and clients.
// Dependencies: contract-probe-core, contract-probe-runner, reqwest, serde
// ============================================================================

//! ## Overview
//! Each service module exposes message constants, wire types, a typed client
//! over [`ServiceClient`], and a declarative suite ([`math_suite`],
//! [`tasks_suite`]) that the runner executes against a stage.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod math;
pub mod tasks;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::ClientError;
pub use client::RawResponse;
pub use client::ServiceClient;
pub use math::BatchOutcome;
pub use math::BatchRequest;
pub use math::MathClient;
pub use math::math_suite;
pub use tasks::NewTask;
pub use tasks::StatusUpdate;
pub use tasks::Task;
pub use tasks::TaskReply;
pub use tasks::TaskStatus;
pub use tasks::TasksClient;
pub use tasks::tasks_suite;

// ============================================================================
// SECTION: Built-in Suites
// ============================================================================

use contract_probe_runner::Suite;

/// Returns the built-in suite for `name` (`math` or `tasks`).
#[must_use]
pub fn builtin_suite(name: &str) -> Option<Suite> {
    match name {
        math::SERVICE => Some(math_suite()),
        tasks::SERVICE => Some(tasks_suite()),
        _ => None,
    }
}

/// Names of the built-in suites in run order.
pub const BUILTIN_SUITES: [&str; 2] = [math::SERVICE, tasks::SERVICE];
