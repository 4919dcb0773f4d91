// system-tests/tests/helpers/targets.rs
// ============================================================================
// Module: Service Targets
// Description: Chooses between a live deployment and an in-process stub.
// Purpose: Let contract tests run hermetically or against a real stage.
// Dependencies: system-tests, contract-probe-runner, contract-probe-services
// ============================================================================

use contract_probe_runner::SuiteRunner;
use contract_probe_runner::Verifier;
use contract_probe_services::ServiceClient;
use system_tests::config::SystemTestConfig;
use url::Url;

use super::math_stub::MathStub;
use super::math_stub::spawn_math_stub;
use super::tasks_stub::TasksStub;
use super::tasks_stub::spawn_tasks_stub;
use super::timeouts::REQUEST_TIMEOUT;
use super::timeouts::resolve_timeout;

/// Stage label used in reports produced by system-tests.
pub const STAGE: &str = "system-test";

/// Keeps a stub alive for as long as the target is in use.
pub enum StubGuard {
    /// Live deployment; nothing to keep alive.
    Live,
    /// Math stub.
    Math(MathStub),
    /// Tasks stub.
    Tasks(TasksStub),
}

/// Base URL under test plus whatever serves it.
pub struct ServiceTarget {
    base_url: Url,
    guard: StubGuard,
}

impl ServiceTarget {
    /// Returns the service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true when the target is an in-process stub.
    pub fn is_stub(&self) -> bool {
        !matches!(self.guard, StubGuard::Live)
    }

    /// Builds a verifier with the system-test request timeout.
    pub fn verifier(&self) -> Result<Verifier, String> {
        Verifier::new(self.base_url.clone(), Some(resolve_timeout(REQUEST_TIMEOUT)?))
            .map_err(|err| err.to_string())
    }

    /// Builds a suite runner labelled with [`STAGE`].
    pub fn runner(&self) -> Result<SuiteRunner, String> {
        Ok(SuiteRunner::new(self.verifier()?, STAGE))
    }

    /// Builds a typed-client transport with the system-test request timeout.
    pub fn service_client(&self) -> Result<ServiceClient, String> {
        ServiceClient::new(self.base_url.clone(), Some(resolve_timeout(REQUEST_TIMEOUT)?))
            .map_err(|err| err.to_string())
    }
}

/// Returns the live math service when configured, otherwise a fresh stub.
pub fn math_target() -> Result<ServiceTarget, String> {
    let config = SystemTestConfig::load()?;
    if let Some(base_url) = config.math_url {
        return Ok(ServiceTarget {
            base_url,
            guard: StubGuard::Live,
        });
    }
    let stub = spawn_math_stub()?;
    Ok(ServiceTarget {
        base_url: stub.base_url().clone(),
        guard: StubGuard::Math(stub),
    })
}

/// Returns the live tasks service when configured, otherwise a fresh stub.
pub fn tasks_target() -> Result<ServiceTarget, String> {
    let config = SystemTestConfig::load()?;
    if let Some(base_url) = config.tasks_url {
        return Ok(ServiceTarget {
            base_url,
            guard: StubGuard::Live,
        });
    }
    let stub = spawn_tasks_stub()?;
    Ok(ServiceTarget {
        base_url: stub.base_url().clone(),
        guard: StubGuard::Tasks(stub),
    })
}
