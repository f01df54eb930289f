// crates/liars-dice-harness/src/suite/concurrent.rs
// ============================================================================
// Module: Concurrent Creation Scenario
// Description: Runs the load harness against `POST /games`.
// Purpose: Fail the case when concurrent creation errors or runs slow.
// Dependencies: tracing
// ============================================================================

use std::sync::Arc;

use tracing::info;

use super::CaseError;
use super::SuiteContext;
use crate::load::GameCreator;
use crate::load::Verdict;
use crate::load::run_load;

/// Creates games concurrently and judges the run against its thresholds.
pub(super) async fn create_concurrent_games(ctx: &SuiteContext) -> Result<(), CaseError> {
    let settings = ctx.config.load;
    let run = settings.load_run();
    let creator = Arc::new(GameCreator::new(
        ctx.client.without_transcript(),
        settings.players,
        settings.dice,
    ));
    let result = run_load(&run, creator).await?;
    info!(summary = %result, "concurrent game creation finished");
    match run.thresholds.evaluate(&result) {
        Verdict::Pass => Ok(()),
        Verdict::Fail(violations) => Err(CaseError::Thresholds {
            summary: result.to_string(),
            violations,
        }),
    }
}
