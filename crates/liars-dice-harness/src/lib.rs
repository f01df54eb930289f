// crates/liars-dice-harness/src/lib.rs
// ============================================================================
// Module: Liar's Dice Harness Library
// Description: HTTP test harness for an external Liar's Dice game server.
// Purpose: Provide the game client, assertions, load harness, and scenarios.
// Dependencies: reqwest, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! This crate drives a running Liar's Dice server over REST and checks that
//! its responses are well formed. It bundles:
//! - [`client`]: a typed wrapper over the game endpoints.
//! - [`assertions`]: response checks shared by every scenario.
//! - [`load`]: the concurrent create-game load harness and its statistics.
//! - [`suite`]: the catalogue of named scenarios and the suite runner.
//! - [`report`]: machine-readable run reports.
//!
//! The server under test is external; nothing here implements game rules.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod client;
pub mod config;
pub mod load;
pub mod report;
pub mod suite;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use assertions::AssertionFailure;
pub use client::ApiResponse;
pub use client::ClientError;
pub use client::GameClient;
pub use config::HarnessConfig;
pub use load::AggregateResult;
pub use load::HarnessError;
pub use load::LoadRun;
pub use load::Verdict;
pub use load::assert_thresholds;
pub use load::run_load;
pub use report::TestReporter;
pub use suite::SuiteReport;
pub use suite::SuiteRunner;
