// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep request timeouts consistent and configurable across suites.
// ============================================================================

use std::time::Duration;

use system_tests::config::SystemTestConfig;

/// Default per-request timeout for contract runs.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the effective timeout, honoring `CONTRACT_PROBE_SYSTEM_TEST_TIMEOUT_SEC`
/// when set. The override acts as a minimum so it never shortens a longer
/// requested timeout.
pub fn resolve_timeout(requested: Duration) -> Result<Duration, String> {
    let config = SystemTestConfig::load()?;
    Ok(config
        .timeout
        .map_or(requested, |override_timeout| std::cmp::max(requested, override_timeout)))
}
