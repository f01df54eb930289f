// crates/liars-dice-harness/src/load/stats.rs
// ============================================================================
// Module: Load Statistics
// Description: Aggregate latency/error statistics and threshold verdicts.
// Purpose: Summarize merged worker buffers and judge them against limits.
// Dependencies: std
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use super::harness::WorkerResult;
use crate::client::duration_ms;

/// Errors quoted in summaries before truncation.
const SUMMARY_ERROR_SAMPLE: usize = 5;

// ============================================================================
// SECTION: Thresholds
// ============================================================================

/// Latency limits for a load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Maximum acceptable latency of any single call.
    pub per_call_max: Duration,
    /// Maximum acceptable mean latency.
    pub average_max: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            per_call_max: Duration::from_secs(2),
            average_max: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// SECTION: Latency Statistics
// ============================================================================

/// Latency statistics over successful calls. Never built from zero samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStats {
    /// Number of samples.
    pub samples: usize,
    /// Arithmetic mean.
    pub mean: Duration,
    /// Fastest call.
    pub min: Duration,
    /// Slowest call.
    pub max: Duration,
    /// Median (nearest rank).
    pub p50: Duration,
    /// 95th percentile (nearest rank).
    pub p95: Duration,
}

impl LatencyStats {
    /// Computes statistics, or `None` when there are no samples.
    #[must_use]
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let total_nanos: u128 = sorted.iter().map(Duration::as_nanos).sum();
        let count = u128::try_from(sorted.len()).unwrap_or(u128::MAX);
        let mean_nanos = u64::try_from(total_nanos / count).unwrap_or(u64::MAX);
        Some(Self {
            samples: sorted.len(),
            mean: Duration::from_nanos(mean_nanos),
            min,
            max,
            p50: nearest_rank(&sorted, 50),
            p95: nearest_rank(&sorted, 95),
        })
    }
}

/// Nearest-rank percentile over a sorted, non-empty slice.
fn nearest_rank(sorted: &[Duration], percentile: usize) -> Duration {
    let rank = sorted.len().saturating_mul(percentile).saturating_add(99) / 100;
    let index = rank.max(1).saturating_sub(1).min(sorted.len().saturating_sub(1));
    sorted.get(index).copied().unwrap_or_default()
}

// ============================================================================
// SECTION: Aggregate Result
// ============================================================================

/// Summary of a completed load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    /// Calls issued across all workers.
    pub total_calls: usize,
    /// Failed calls.
    pub error_count: usize,
    /// Failure descriptions, grouped by worker in worker order.
    pub errors: Vec<String>,
    /// Created identifiers, grouped by worker in worker order.
    pub ids: Vec<String>,
    /// Latency over successful calls; `None` when no call succeeded.
    pub latency: Option<LatencyStats>,
}

impl AggregateResult {
    /// Merges worker buffers into one summary.
    #[must_use]
    pub fn from_workers(results: &[WorkerResult]) -> Self {
        let durations: Vec<Duration> =
            results.iter().flat_map(|result| result.durations.iter().copied()).collect();
        let errors: Vec<String> =
            results.iter().flat_map(|result| result.errors.iter().cloned()).collect();
        let ids = results.iter().flat_map(|result| result.ids.iter().cloned()).collect();
        Self {
            total_calls: durations.len().saturating_add(errors.len()),
            error_count: errors.len(),
            latency: LatencyStats::from_samples(&durations),
            errors,
            ids,
        }
    }

    /// Successful calls.
    #[must_use]
    pub const fn success_count(&self) -> usize {
        self.total_calls.saturating_sub(self.error_count)
    }

    /// Mean latency, or `None` when no call succeeded.
    #[must_use]
    pub fn mean_duration(&self) -> Option<Duration> {
        self.latency.map(|stats| stats.mean)
    }

    /// Maximum latency, or `None` when no call succeeded.
    #[must_use]
    pub fn max_duration(&self) -> Option<Duration> {
        self.latency.map(|stats| stats.max)
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} calls, {} errors", self.total_calls, self.error_count)?;
        match self.latency {
            Some(stats) => write!(
                f,
                ", mean {} ms, max {} ms, p95 {} ms",
                duration_ms(stats.mean),
                duration_ms(stats.max),
                duration_ms(stats.p95)
            ),
            None => write!(f, ", no latency data (no successful calls)"),
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// One reason a run failed its thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdViolation {
    /// At least one call failed.
    CallErrors {
        /// Failed calls.
        count: usize,
        /// The first few failure descriptions.
        sample: Vec<String>,
    },
    /// Mean latency exceeded its limit.
    AverageLatency {
        /// Observed mean.
        observed: Duration,
        /// Configured limit.
        limit: Duration,
    },
    /// A single call exceeded the per-call limit.
    CallLatency {
        /// Slowest observed call.
        observed: Duration,
        /// Configured limit.
        limit: Duration,
    },
    /// No latency could be measured and no error explains why.
    NoLatencyData,
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallErrors {
                count,
                sample,
            } => {
                write!(f, "{count} errors occurred while creating games concurrently")?;
                for error in sample {
                    write!(f, "\n  - {error}")?;
                }
                if *count > sample.len() {
                    write!(f, "\n  - ... {} more", count.saturating_sub(sample.len()))?;
                }
                Ok(())
            }
            Self::AverageLatency {
                observed,
                limit,
            } => write!(
                f,
                "mean response time {} ms exceeds {} ms",
                duration_ms(*observed),
                duration_ms(*limit)
            ),
            Self::CallLatency {
                observed,
                limit,
            } => write!(
                f,
                "slowest response took {} ms, limit is {} ms",
                duration_ms(*observed),
                duration_ms(*limit)
            ),
            Self::NoLatencyData => write!(f, "no latency data was recorded"),
        }
    }
}

/// Outcome of [`assert_thresholds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every threshold held.
    Pass,
    /// One or more thresholds were violated.
    Fail(Vec<ThresholdViolation>),
}

impl Verdict {
    /// Returns true for [`Verdict::Pass`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns the violations, empty on pass.
    #[must_use]
    pub fn violations(&self) -> &[ThresholdViolation] {
        match self {
            Self::Pass => &[],
            Self::Fail(violations) => violations,
        }
    }
}

/// Judges an aggregate against latency limits.
///
/// Fails when any call errored, when the mean exceeds `average_max`, or when
/// the slowest call exceeds `per_call_max`. Every applicable violation is
/// reported.
#[must_use]
pub fn assert_thresholds(
    result: &AggregateResult,
    per_call_max: Duration,
    average_max: Duration,
) -> Verdict {
    let mut violations = Vec::new();
    if result.error_count > 0 {
        violations.push(ThresholdViolation::CallErrors {
            count: result.error_count,
            sample: result.errors.iter().take(SUMMARY_ERROR_SAMPLE).cloned().collect(),
        });
    }
    match result.latency {
        Some(stats) => {
            if stats.mean > average_max {
                violations.push(ThresholdViolation::AverageLatency {
                    observed: stats.mean,
                    limit: average_max,
                });
            }
            if stats.max > per_call_max {
                violations.push(ThresholdViolation::CallLatency {
                    observed: stats.max,
                    limit: per_call_max,
                });
            }
        }
        None if result.error_count == 0 => violations.push(ThresholdViolation::NoLatencyData),
        None => {}
    }
    if violations.is_empty() { Verdict::Pass } else { Verdict::Fail(violations) }
}

impl Thresholds {
    /// Judges `result` against these limits.
    #[must_use]
    pub fn evaluate(&self, result: &AggregateResult) -> Verdict {
        assert_thresholds(result, self.per_call_max, self.average_max)
    }
}
