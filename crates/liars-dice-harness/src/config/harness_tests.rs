// crates/liars-dice-harness/src/config/harness_tests.rs
// ============================================================================
// Module: Harness Config Unit Tests
// Description: Unit coverage for connection string resolution and defaults.
// Dependencies: std, url
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::time::Duration;

use super::ConfigError;
use super::HarnessConfig;
use super::LoadSettings;

#[test]
fn bare_host_gets_http_scheme_and_default_port() {
    let config = HarnessConfig::new("localhost");
    let url = config.connection_string().unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/");
}

#[test]
fn explicit_port_in_url_wins_over_configured_port() {
    let mut config = HarnessConfig::new("https://dice.example:9443");
    config.server_port = 1234;
    let url = config.connection_string().unwrap();
    assert_eq!(url.as_str(), "https://dice.example:9443/");
}

#[test]
fn configured_port_fills_missing_port() {
    let mut config = HarnessConfig::new("http://127.0.0.1");
    config.server_port = 3000;
    let url = config.connection_string().unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:3000/");
}

#[test]
fn path_and_query_are_dropped() {
    let config = HarnessConfig::new("http://dice.example:8000/games?x=1");
    let url = config.connection_string().unwrap();
    assert_eq!(url.as_str(), "http://dice.example:8000/");
}

#[test]
fn empty_url_is_rejected() {
    let config = HarnessConfig::new("   ");
    assert!(matches!(config.connection_string(), Err(ConfigError::MissingServerUrl)));
}

#[test]
fn unparsable_url_is_rejected() {
    let config = HarnessConfig::new("http://[not-a-host");
    assert!(matches!(config.connection_string(), Err(ConfigError::InvalidServerUrl { .. })));
}

#[test]
fn load_defaults_match_concurrent_creation_scenario() {
    let settings = LoadSettings::default();
    let run = settings.load_run();
    assert_eq!(run.worker_count, 20);
    assert_eq!(run.operations_per_worker, 500);
    assert_eq!(run.thresholds.per_call_max, Duration::from_secs(2));
    assert_eq!(run.thresholds.average_max, Duration::from_secs(1));
    assert_eq!(run.total_calls(), 10_000);
}
