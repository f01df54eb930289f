// system-tests/tests/load.rs
// ============================================================================
// Module: Load Harness System Tests
// Description: Concurrent game creation against the stub game server.
// Purpose: Validate call accounting, error capture, and thresholds over HTTP.
// Dependencies: system-tests helpers, liars-dice-harness
// ============================================================================

//! Load harness system tests for the Liar's Dice harness.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use helpers::artifacts::harness_config;
use helpers::game_server_stub::StubOptions;
use helpers::game_server_stub::spawn_game_server;
use helpers::game_server_stub::spawn_game_server_with;
use liars_dice_harness::GameClient;
use liars_dice_harness::LoadRun;
use liars_dice_harness::Verdict;
use liars_dice_harness::assert_thresholds;
use liars_dice_harness::load::GameCreator;
use liars_dice_harness::load::ThresholdViolation;
use liars_dice_harness::report::TestArtifacts;
use liars_dice_harness::run_load;
use serde_json::json;

const WORKERS: usize = 8;
const GAMES_PER_WORKER: usize = 25;

fn creator(base_url: &str, test_name: &str) -> Result<(Arc<GameCreator>, TestArtifacts), String> {
    let config = harness_config(base_url, test_name)?;
    let artifacts = TestArtifacts::new(&config.output_directory).map_err(|err| err.to_string())?;
    let client = GameClient::from_config(&config).map_err(|err| err.to_string())?;
    Ok((Arc::new(GameCreator::new(client.without_transcript(), 5, 5)), artifacts))
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creation_passes_thresholds() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_game_server()?;
    let (creator, artifacts) = creator(server.base_url(), "concurrent_creation_passes_thresholds")?;
    let run = LoadRun::new(WORKERS, GAMES_PER_WORKER);

    let result = run_load(&run, creator).await?;
    artifacts.write_json(
        "load_summary.json",
        &json!({ "summary": result.to_string(), "errors": &result.errors }),
    )?;

    assert_eq!(result.total_calls, WORKERS * GAMES_PER_WORKER);
    assert_eq!(result.error_count, 0, "{:?}", result.errors);
    assert_eq!(server.create_calls(), u64::try_from(WORKERS * GAMES_PER_WORKER)?);
    let unique: HashSet<&String> = result.ids.iter().collect();
    assert_eq!(unique.len(), result.ids.len());
    assert_eq!(run.thresholds.evaluate(&result), Verdict::Pass);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_counted_per_call() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_game_server_with(StubOptions {
        fail_every: Some(7),
        create_delay: Duration::ZERO,
    })?;
    let (creator, _artifacts) = creator(server.base_url(), "server_errors_are_counted_per_call")?;
    let run = LoadRun::new(4, 25);

    let result = run_load(&run, creator).await?;

    assert_eq!(result.total_calls, 100);
    assert_eq!(result.error_count, 100 / 7);
    assert_eq!(result.success_count(), 100 - 100 / 7);
    assert!(result.errors.iter().all(|error| error.contains("500")), "{:?}", result.errors);
    let verdict = assert_thresholds(&result, Duration::from_secs(2), Duration::from_secs(1));
    match verdict.violations() {
        [ThresholdViolation::CallErrors { count, .. }] => assert_eq!(*count, 14),
        other => return Err(format!("unexpected violations {other:?}").into()),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_server_violates_latency_limits() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_game_server_with(StubOptions {
        fail_every: None,
        create_delay: Duration::from_millis(150),
    })?;
    let (creator, _artifacts) = creator(server.base_url(), "slow_server_violates_latency_limits")?;
    let run = LoadRun::new(2, 3);

    let result = run_load(&run, creator).await?;
    let verdict = assert_thresholds(&result, Duration::from_millis(100), Duration::from_millis(50));

    assert_eq!(result.error_count, 0, "{:?}", result.errors);
    assert!(result.mean_duration().is_some_and(|mean| mean >= Duration::from_millis(150)));
    assert!(matches!(
        verdict.violations(),
        [ThresholdViolation::AverageLatency { .. }, ThresholdViolation::CallLatency { .. }]
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn per_call_timeout_records_errors() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_game_server_with(StubOptions {
        fail_every: None,
        create_delay: Duration::from_millis(500),
    })?;
    let (creator, _artifacts) = creator(server.base_url(), "per_call_timeout_records_errors")?;
    let run = LoadRun::new(2, 2).with_per_call_timeout(Duration::from_millis(50));

    let result = run_load(&run, creator).await?;

    assert_eq!(result.total_calls, 4);
    assert_eq!(result.error_count, 4);
    assert!(result.latency.is_none());
    assert!(result.errors.iter().all(|error| error.contains("per-call timeout")));
    Ok(())
}
