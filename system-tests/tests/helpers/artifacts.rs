// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Resolve per-test run roots and harness configuration.
// Dependencies: system-tests, liars-dice-harness
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use liars_dice_harness::HarnessConfig;
use liars_dice_harness::TestReporter;
use system_tests::config::SystemTestConfig;

/// Request timeout used when the environment does not set one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Returns the artifact directory for a test.
pub fn run_root(test_name: &str) -> Result<PathBuf, String> {
    let config = SystemTestConfig::load()?;
    Ok(config.run_root.map_or_else(
        || {
            PathBuf::from("target/system-tests")
                .join(format!("run_{}", now_millis()))
                .join(test_name)
        },
        |root| root.join(test_name),
    ))
}

/// Creates a reporter writing into the configured output directory.
pub fn reporter(config: &HarnessConfig, test_name: &str) -> Result<TestReporter, String> {
    TestReporter::new(&config.output_directory, test_name).map_err(|err| err.to_string())
}

/// Harness configuration pointed at `base_url` with the test timeout.
pub fn harness_config(base_url: &str, test_name: &str) -> Result<HarnessConfig, String> {
    let env = SystemTestConfig::load()?;
    let mut config = HarnessConfig::new(base_url);
    config.set_request_timeout(env.timeout.unwrap_or(DEFAULT_TIMEOUT));
    config.output_directory = run_root(test_name)?;
    Ok(config)
}
