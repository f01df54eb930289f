// crates/liars-dice-harness/src/suite/mod.rs
// ============================================================================
// Module: Scenario Suite
// Description: Named Liar's Dice scenarios and the suite runner.
// Purpose: Execute scenarios against the server and record their outcomes.
// Dependencies: serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! A [`Scenario`] is a named, self-contained check against the server. The
//! [`catalogue`] lists every scenario; [`SuiteRunner`] probes the landing
//! page, then runs each selected scenario in order and records a
//! [`CaseReport`]. Scenarios known to crash the reference server are listed
//! but skipped unless the configuration opts in.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod api;
mod catalogue;
mod concurrent;
pub mod fixtures;
mod gameplay;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

pub use catalogue::catalogue;
pub use catalogue::select;
pub use fixtures::FormTemplate;
pub use fixtures::FormValue;

use crate::assertions::AssertionFailure;
use crate::client::ClientError;
use crate::client::GameClient;
use crate::client::duration_ms;
use crate::config::HarnessConfig;
use crate::load::HarnessError;
use crate::load::ThresholdViolation;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a scenario did not pass.
#[derive(Debug, Error)]
pub enum CaseError {
    /// A response check failed.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    /// A request could not be completed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The load harness itself failed.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// A load run completed but violated its thresholds.
    #[error("load thresholds violated ({summary}){}", render_violations(.violations))]
    Thresholds {
        /// Aggregate summary line.
        summary: String,
        /// Every violated threshold.
        violations: Vec<ThresholdViolation>,
    },
    /// The scenario decided it cannot run.
    #[error("{0}")]
    Skip(String),
}

/// Renders violations as an indented list.
fn render_violations(violations: &[ThresholdViolation]) -> String {
    violations.iter().map(|violation| format!("\n- {violation}")).collect()
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// What a scenario exercises.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioKind {
    /// `GET /games` returns a JSON list.
    ListGames,
    /// A 5x5 game is created with every game key.
    ValidGame,
    /// A malformed create body is rejected.
    InvalidGame(FormTemplate),
    /// Random ids of length `1..=max_length` are rejected.
    InvalidGameIds {
        /// Longest id tried.
        max_length: usize,
    },
    /// A game with `i64::MAX` dice is handled.
    HugeDiceCount,
    /// A game with `i64::MAX` players is handled.
    HugePlayerCount,
    /// A claim with no fields is rejected.
    EmptyClaim,
    /// A one-die claim of a held face is accepted.
    ValidClaim,
    /// A templated claim is accepted.
    ValidClaimVariant(FormTemplate),
    /// A templated claim is rejected.
    InvalidClaimVariant(FormTemplate),
    /// Moving a die to the center re-rolls the rest of the hand.
    MoveDiceRerolls,
    /// The same player cannot claim twice in a row.
    ClaimTwice,
    /// A claim against a missing game is rejected.
    ClaimInMissingGame,
    /// A challenge against a missing game is rejected.
    ChallengeInMissingGame,
    /// A challenge with no outstanding claim is rejected.
    ChallengeBeforeClaim,
    /// A true claim holds and a false claim fails when challenged.
    ChallengeAfterClaim,
    /// A game is played until one player is left.
    Gameplay {
        /// Players in the game.
        players: u32,
    },
    /// Concurrent creation stays within error and latency thresholds.
    ConcurrentGames,
}

/// A named scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Stable case name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Reason the scenario is skipped by default, if it crashes the server.
    pub known_crash: Option<&'static str>,
    /// What the scenario exercises.
    pub kind: ScenarioKind,
}

impl Scenario {
    /// Creates a scenario.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ScenarioKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            known_crash: None,
            kind,
        }
    }

    /// Marks the scenario as known to crash the server.
    #[must_use]
    pub const fn known_crash(mut self, reason: &'static str) -> Self {
        self.known_crash = Some(reason);
        self
    }

    /// Executes the scenario.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] describing the first failed check.
    pub async fn run(&self, ctx: &SuiteContext) -> Result<(), CaseError> {
        let client = &ctx.client;
        match &self.kind {
            ScenarioKind::ListGames => api::list_games(client).await,
            ScenarioKind::ValidGame => api::valid_game(client).await,
            ScenarioKind::InvalidGame(template) => api::invalid_game(client, template).await,
            ScenarioKind::InvalidGameIds {
                max_length,
            } => api::invalid_game_ids(client, *max_length).await,
            ScenarioKind::HugeDiceCount => api::huge_dice_count(client).await,
            ScenarioKind::HugePlayerCount => api::huge_player_count(client).await,
            ScenarioKind::EmptyClaim => api::empty_claim(client).await,
            ScenarioKind::ValidClaim => api::valid_claim(client).await,
            ScenarioKind::ValidClaimVariant(template) => {
                api::templated_claim(client, template, true).await
            }
            ScenarioKind::InvalidClaimVariant(template) => {
                api::templated_claim(client, template, false).await
            }
            ScenarioKind::MoveDiceRerolls => api::move_dice_rerolls(client).await,
            ScenarioKind::ClaimTwice => api::claim_twice(client).await,
            ScenarioKind::ClaimInMissingGame => api::claim_in_missing_game(client).await,
            ScenarioKind::ChallengeInMissingGame => api::challenge_in_missing_game(client).await,
            ScenarioKind::ChallengeBeforeClaim => api::challenge_before_claim(client).await,
            ScenarioKind::ChallengeAfterClaim => api::challenge_after_claim(client).await,
            ScenarioKind::Gameplay {
                players,
            } => gameplay::play(client, *players, gameplay::STANDARD_DICE).await,
            ScenarioKind::ConcurrentGames => concurrent::create_concurrent_games(ctx).await,
        }
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every check held.
    Passed,
    /// A check failed.
    Failed(String),
    /// The scenario did not run.
    Skipped(String),
}

/// Recorded result of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub name: String,
    /// Case description.
    pub description: String,
    /// Outcome.
    pub outcome: CaseOutcome,
    /// Wall-clock time spent in the case.
    pub duration_ms: u64,
}

/// Recorded result of a suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Server root that was tested.
    pub server: String,
    /// Unix start time in milliseconds.
    pub started_at_ms: u128,
    /// Total wall-clock time.
    pub duration_ms: u64,
    /// Per-case results in execution order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Number of cases with the given outcome class.
    fn count(&self, predicate: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.cases.iter().filter(|case| predicate(&case.outcome)).count()
    }

    /// Passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Passed))
    }

    /// Failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Failed(_)))
    }

    /// Skipped cases.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, CaseOutcome::Skipped(_)))
    }

    /// True when no case failed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed() == 0
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Shared state handed to every scenario.
#[derive(Clone)]
pub struct SuiteContext {
    /// Client for the server under test.
    pub client: GameClient,
    /// Run configuration.
    pub config: HarnessConfig,
}

/// Runs scenarios against one server.
pub struct SuiteRunner {
    /// Shared scenario state.
    ctx: SuiteContext,
}

impl SuiteRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(client: GameClient, config: HarnessConfig) -> Self {
        Self {
            ctx: SuiteContext {
                client,
                config,
            },
        }
    }

    /// Returns the client, including its transcript.
    #[must_use]
    pub const fn client(&self) -> &GameClient {
        &self.ctx.client
    }

    /// Runs `scenarios` in order and records every outcome.
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started = Instant::now();
        let started_at_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let server = self.ctx.client.base_url().to_string();
        let available = self.ctx.client.site_available().await;
        if !available {
            warn!(server = %server, "site not available; skipping every scenario");
        }

        let mut cases = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let case_started = Instant::now();
            let outcome = if !available {
                CaseOutcome::Skipped(format!("Site {server} not available"))
            } else if let Some(reason) =
                scenario.known_crash.filter(|_| !self.ctx.config.run_known_crashes)
            {
                CaseOutcome::Skipped(reason.to_string())
            } else {
                match scenario.run(&self.ctx).await {
                    Ok(()) => CaseOutcome::Passed,
                    Err(CaseError::Skip(reason)) => CaseOutcome::Skipped(reason),
                    Err(err) => CaseOutcome::Failed(err.to_string()),
                }
            };
            let elapsed = case_started.elapsed();
            match &outcome {
                CaseOutcome::Passed => info!(case = %scenario.name, "passed"),
                CaseOutcome::Failed(message) => {
                    warn!(case = %scenario.name, error = %message, "failed");
                }
                CaseOutcome::Skipped(reason) => info!(case = %scenario.name, reason = %reason, "skipped"),
            }
            cases.push(CaseReport {
                name: scenario.name.clone(),
                description: scenario.description.clone(),
                outcome,
                duration_ms: duration_ms(elapsed),
            });
        }

        let report = SuiteReport {
            server,
            started_at_ms,
            duration_ms: duration_ms(started.elapsed()),
            cases,
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            total_time_ms = report.duration_ms,
            "suite finished"
        );
        report
    }
}
