// crates/liars-dice-harness/src/load/harness.rs
// ============================================================================
// Module: Load Harness Runner
// Description: Worker fan-out, per-worker buffers, and the join barrier.
// Purpose: Issue workers x operations create calls and merge their outcomes.
// Dependencies: async-trait, thiserror, tokio, tracing
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinError;
use tokio::task::JoinSet;
use tracing::debug;
use tracing::info;

use super::stats::AggregateResult;
use super::stats::Thresholds;
use crate::client::duration_ms;
use crate::config::DEFAULT_REQUEST_TIMEOUT;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Harness-level failures. Per-call errors never surface here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarnessError {
    /// The run parameters cannot produce any calls.
    #[error("invalid load run: {0}")]
    InvalidRun(String),
    /// A worker panicked or was cancelled before finishing its batch.
    #[error("load worker aborted: {reason}")]
    WorkerAborted {
        /// Panic message or cancellation reason.
        reason: String,
    },
    /// A worker finished with fewer or more records than calls assigned.
    #[error("load worker {worker} recorded {actual} outcomes, expected {expected}")]
    IncompleteWorker {
        /// Worker index.
        worker: usize,
        /// Calls assigned to the worker.
        expected: usize,
        /// Outcomes recorded by the worker.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Create Capability
// ============================================================================

/// Outcome of one successful create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedResource {
    /// Identifier of the created resource.
    pub id: String,
    /// Wall-clock duration of the call as measured by the caller.
    pub elapsed: Duration,
}

/// Performs one create-resource call.
///
/// Implementations report their own elapsed time; a failure is described by
/// a message and recorded by the harness.
#[async_trait]
pub trait CreateResource: Send + Sync {
    /// Performs one create call.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure.
    async fn create(&self) -> Result<CreatedResource, String>;
}

// ============================================================================
// SECTION: Run Description
// ============================================================================

/// Parameters of one load invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRun {
    /// Number of concurrent workers.
    pub worker_count: usize,
    /// Calls issued sequentially by each worker.
    pub operations_per_worker: usize,
    /// Latency limits applied by [`super::assert_thresholds`].
    pub thresholds: Thresholds,
    /// Hard bound on a single call; expiry is recorded as a call error.
    pub per_call_timeout: Duration,
}

impl LoadRun {
    /// Creates a run with default thresholds and per-call timeout.
    #[must_use]
    pub fn new(worker_count: usize, operations_per_worker: usize) -> Self {
        Self {
            worker_count,
            operations_per_worker,
            thresholds: Thresholds::default(),
            per_call_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the latency thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replaces the per-call timeout.
    #[must_use]
    pub const fn with_per_call_timeout(mut self, timeout: Duration) -> Self {
        self.per_call_timeout = timeout;
        self
    }

    /// Total calls the run issues.
    #[must_use]
    pub const fn total_calls(&self) -> usize {
        self.worker_count.saturating_mul(self.operations_per_worker)
    }

    /// Rejects runs that would issue no calls.
    fn validate(&self) -> Result<(), HarnessError> {
        if self.worker_count == 0 {
            return Err(HarnessError::InvalidRun("worker count must be at least 1".to_string()));
        }
        if self.operations_per_worker == 0 {
            return Err(HarnessError::InvalidRun(
                "operations per worker must be at least 1".to_string(),
            ));
        }
        if self.per_call_timeout.is_zero() {
            return Err(HarnessError::InvalidRun(
                "per-call timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Worker Buffers
// ============================================================================

/// Outcomes recorded by one worker, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerResult {
    /// Worker index.
    pub worker: usize,
    /// Elapsed time of each successful call.
    pub durations: Vec<Duration>,
    /// Description of each failed call.
    pub errors: Vec<String>,
    /// Identifier of each created resource.
    pub ids: Vec<String>,
}

impl WorkerResult {
    /// Creates an empty buffer sized for `operations` calls.
    fn with_capacity(worker: usize, operations: usize) -> Self {
        Self {
            worker,
            durations: Vec::with_capacity(operations),
            errors: Vec::new(),
            ids: Vec::with_capacity(operations),
        }
    }

    /// Records a successful call.
    fn record_success(&mut self, created: CreatedResource) {
        self.ids.push(created.id);
        self.durations.push(created.elapsed);
    }

    /// Records a failed call.
    fn record_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Number of call outcomes recorded.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.durations.len().saturating_add(self.errors.len())
    }

    /// Checks that the buffer holds one outcome per assigned call.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::IncompleteWorker`] when the counts differ.
    pub fn ensure_complete(self, expected: usize) -> Result<Self, HarnessError> {
        let actual = self.attempts();
        if actual == expected {
            Ok(self)
        } else {
            Err(HarnessError::IncompleteWorker {
                worker: self.worker,
                expected,
                actual,
            })
        }
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs `run.worker_count` workers, each calling `creator` sequentially
/// `run.operations_per_worker` times, and aggregates every outcome once all
/// workers have joined.
///
/// Must be called from within a multi-threaded tokio runtime for the workers
/// to run in parallel.
///
/// # Errors
///
/// Returns [`HarnessError`] when the run is invalid or a worker fails to
/// complete its batch. The remaining workers are aborted in that case.
pub async fn run_load<C>(run: &LoadRun, creator: Arc<C>) -> Result<AggregateResult, HarnessError>
where
    C: CreateResource + ?Sized + 'static,
{
    run.validate()?;
    info!(
        workers = run.worker_count,
        operations_per_worker = run.operations_per_worker,
        per_call_timeout_ms = duration_ms(run.per_call_timeout),
        "starting load run"
    );
    let started = Instant::now();

    let mut joins = JoinSet::new();
    for worker in 0 .. run.worker_count {
        joins.spawn(drive_worker(
            worker,
            run.operations_per_worker,
            run.per_call_timeout,
            Arc::clone(&creator),
        ));
    }

    let mut results = Vec::with_capacity(run.worker_count);
    while let Some(joined) = joins.join_next().await {
        let checked = match joined {
            Ok(result) => result.ensure_complete(run.operations_per_worker),
            Err(err) => Err(HarnessError::WorkerAborted {
                reason: join_failure_reason(err),
            }),
        };
        let result = match checked {
            Ok(result) => result,
            Err(err) => {
                joins.abort_all();
                return Err(err);
            }
        };
        debug!(
            worker = result.worker,
            successes = result.durations.len(),
            errors = result.errors.len(),
            "load worker finished"
        );
        results.push(result);
    }
    results.sort_by_key(|result| result.worker);

    let aggregate = AggregateResult::from_workers(&results);
    info!(
        total_calls = aggregate.total_calls,
        errors = aggregate.error_count,
        mean_ms = aggregate.mean_duration().map(duration_ms),
        max_ms = aggregate.max_duration().map(duration_ms),
        wall_clock_ms = duration_ms(started.elapsed()),
        "load run finished"
    );
    Ok(aggregate)
}

/// Runs one worker's batch, converting failures and timeouts into records.
async fn drive_worker<C>(
    worker: usize,
    operations: usize,
    per_call_timeout: Duration,
    creator: Arc<C>,
) -> WorkerResult
where
    C: CreateResource + ?Sized,
{
    let mut result = WorkerResult::with_capacity(worker, operations);
    for _ in 0 .. operations {
        match tokio::time::timeout(per_call_timeout, creator.create()).await {
            Ok(Ok(created)) => result.record_success(created),
            Ok(Err(error)) => result.record_error(error),
            Err(_) => result.record_error(format!(
                "call exceeded per-call timeout of {} ms",
                duration_ms(per_call_timeout)
            )),
        }
    }
    result
}

/// Describes why a worker task did not return.
fn join_failure_reason(err: JoinError) -> String {
    if err.is_cancelled() {
        return "worker task was cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .map_or_else(
                || "worker panicked".to_string(),
                |message| format!("worker panicked: {message}"),
            ),
        Err(err) => err.to_string(),
    }
}
