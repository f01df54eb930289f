// crates/liars-dice-harness/src/load/mod.rs
// ============================================================================
// Module: Concurrent Load Harness
// Description: Fan-out create-resource load with latency aggregation.
// Purpose: Drive concurrent game creation and judge latency/error thresholds.
// Dependencies: async-trait, tokio, tracing
// ============================================================================

//! ## Overview
//! [`run_load`] spawns one task per worker on the multi-threaded runtime.
//! Each worker issues its batch of create calls strictly in sequence and
//! keeps its own [`WorkerResult`] buffer; buffers are merged only after every
//! worker has joined, so no partial aggregate is ever observable.
//!
//! Invariants:
//! - Every call attempt yields exactly one duration record or one error record.
//! - A failed call is data; it never aborts its worker or the run.
//! - A worker that dies or returns a short buffer fails the whole run.
//! - [`assert_thresholds`] is pure and performs no I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod creator;
mod harness;
mod stats;


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use creator::GameCreator;
pub use harness::CreateResource;
pub use harness::CreatedResource;
pub use harness::HarnessError;
pub use harness::LoadRun;
pub use harness::WorkerResult;
pub use harness::run_load;
pub use stats::AggregateResult;
pub use stats::LatencyStats;
pub use stats::ThresholdViolation;
pub use stats::Thresholds;
pub use stats::Verdict;
pub use stats::assert_thresholds;
