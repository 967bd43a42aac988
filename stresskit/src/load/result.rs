//! Result types produced by workers and aggregated by the driver.

use serde::{Deserialize, Serialize};

/// Outcome of a single task iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationOutcome {
    /// Whether the iteration's verification passed.
    pub passed: bool,
    /// Bytes moved by the iteration; `None` when the task did not measure.
    pub bytes_moved: Option<u64>,
    /// Optional tag appended to the worker's log tag when non-empty.
    pub log_tag: Option<String>,
}

impl IterationOutcome {
    /// A passing outcome with nothing measured.
    pub fn pass() -> Self {
        Self {
            passed: true,
            bytes_moved: None,
            log_tag: None,
        }
    }

    /// A failing outcome (verification mismatch, not a task error).
    pub fn fail() -> Self {
        Self {
            passed: false,
            bytes_moved: None,
            log_tag: None,
        }
    }

    /// Attaches a byte count to the outcome.
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes_moved = Some(bytes);
        self
    }

    /// Attaches a log tag to the outcome.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.log_tag = Some(tag.into());
        self
    }
}

/// A captured task failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Index of the worker the failure occurred on, when known.
    pub worker: Option<usize>,
    /// 1-based iteration number the failure occurred on.
    pub iteration: u64,
    /// Rendered error chain.
    pub message: String,
}

/// Result accumulated by a single worker over its whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResult {
    /// Index of the worker that produced this result.
    pub worker: usize,
    /// True iff every iteration passed and none failed.
    pub passed: bool,
    /// Iterations completed, including a final failing one.
    pub iterations: u64,
    /// Sum of measured byte counts; `None` when no iteration measured.
    pub bytes_moved: Option<u64>,
    /// Failures in the order they occurred.
    pub failures: Vec<FailureRecord>,
    /// Concatenation of non-empty iteration log tags.
    pub log_tag: Option<String>,
}

impl WorkerResult {
    pub(crate) fn new(worker: usize) -> Self {
        Self {
            worker,
            passed: true,
            iterations: 0,
            bytes_moved: None,
            failures: Vec::new(),
            log_tag: None,
        }
    }

    /// Folds one successful iteration into the result. The first measured
    /// byte count starts the total; later measurements add to it.
    pub(crate) fn record_iteration(&mut self, outcome: IterationOutcome) {
        self.iterations += 1;
        self.passed &= outcome.passed;
        merge_bytes(&mut self.bytes_moved, outcome.bytes_moved);
        append_tag(&mut self.log_tag, outcome.log_tag.as_deref());
    }

    /// Folds a failed iteration into the result. The failing iteration
    /// counts toward the iteration total.
    pub(crate) fn record_failure(&mut self, error: &anyhow::Error) {
        self.iterations += 1;
        self.passed = false;
        self.failures.push(FailureRecord {
            worker: Some(self.worker),
            iteration: self.iterations,
            message: format!("{:#}", error),
        });
    }
}

/// Merged result of all workers in a driver run.
///
/// Aggregation is serialized in worker-index order, independent of the
/// order workers actually finished in, so logs and reports are reproducible
/// for a given set of worker results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    /// AND over all workers' pass flags.
    pub passed: bool,
    /// Number of workers that contributed.
    pub worker_count: usize,
    /// Sum of all workers' iteration counts.
    pub iterations: u64,
    /// Byte totals merged under the same unset rule as a single worker.
    pub bytes_moved: Option<u64>,
    /// All workers' failures, concatenated in worker-index order.
    pub failures: Vec<FailureRecord>,
    /// Workers' log tags, each prefixed with its worker index.
    pub log_tag: Option<String>,
    /// Aggregation anomalies worth surfacing (never silently dropped).
    pub warnings: Vec<String>,
}

impl AggregateResult {
    /// Merges per-worker results in worker-index order.
    pub fn from_workers(results: &[WorkerResult]) -> Self {
        let mut aggregate = Self {
            passed: true,
            worker_count: results.len(),
            iterations: 0,
            bytes_moved: None,
            failures: Vec::new(),
            log_tag: None,
            warnings: Vec::new(),
        };

        for result in results {
            aggregate.passed &= result.passed;
            aggregate.iterations += result.iterations;
            merge_bytes(&mut aggregate.bytes_moved, result.bytes_moved);
            aggregate.failures.extend(result.failures.iter().cloned());
            if let Some(tag) = result.log_tag.as_deref() {
                append_tag(
                    &mut aggregate.log_tag,
                    Some(&format!("w{}:{}", result.worker, tag)),
                );
            }
        }

        // Mixed measured/unmeasured byte counts across workers that did
        // real iterations means the tasks disagree about measurement.
        let measured = results
            .iter()
            .filter(|r| r.iterations > 0 && r.bytes_moved.is_some())
            .count();
        let unmeasured = results
            .iter()
            .filter(|r| r.iterations > 0 && r.bytes_moved.is_none())
            .count();
        if measured > 0 && unmeasured > 0 {
            let warning = format!(
                "byte counts measured on {} of {} active workers; aggregate total is partial",
                measured,
                measured + unmeasured
            );
            log::warn!("{}", warning);
            aggregate.warnings.push(warning);
        }

        aggregate
    }
}

/// Applies the "first measurement is a fresh total" rule: an unset
/// accumulator adopts the sample, an established one adds to it.
fn merge_bytes(acc: &mut Option<u64>, sample: Option<u64>) {
    if let Some(bytes) = sample {
        *acc = Some(acc.unwrap_or(0) + bytes);
    }
}

fn append_tag(acc: &mut Option<String>, tag: Option<&str>) {
    let Some(tag) = tag else { return };
    if tag.is_empty() {
        return;
    }
    match acc {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(tag);
        }
        None => *acc = Some(tag.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_worker(worker: usize, iterations: u64, bytes: Option<u64>) -> WorkerResult {
        let mut result = WorkerResult::new(worker);
        for _ in 0..iterations {
            let mut outcome = IterationOutcome::pass();
            outcome.bytes_moved = bytes;
            result.record_iteration(outcome);
        }
        result
    }

    #[test]
    fn test_worker_result_accumulates_iterations() {
        let result = passing_worker(0, 5, Some(100));
        assert!(result.passed);
        assert_eq!(result.iterations, 5);
        assert_eq!(result.bytes_moved, Some(500));
    }

    #[test]
    fn test_first_measurement_is_fresh_total() {
        let mut result = WorkerResult::new(0);
        result.record_iteration(IterationOutcome::pass());
        assert_eq!(result.bytes_moved, None);

        result.record_iteration(IterationOutcome::pass().with_bytes(42));
        assert_eq!(result.bytes_moved, Some(42));

        result.record_iteration(IterationOutcome::pass().with_bytes(8));
        assert_eq!(result.bytes_moved, Some(50));
    }

    #[test]
    fn test_failure_counts_as_iteration() {
        let mut result = WorkerResult::new(3);
        result.record_iteration(IterationOutcome::pass());
        result.record_iteration(IterationOutcome::pass());
        result.record_failure(&anyhow::anyhow!("disk on fire"));

        assert!(!result.passed);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].worker, Some(3));
        assert_eq!(result.failures[0].iteration, 3);
        assert!(result.failures[0].message.contains("disk on fire"));
    }

    #[test]
    fn test_failing_outcome_fails_worker_without_failure_record() {
        let mut result = WorkerResult::new(0);
        result.record_iteration(IterationOutcome::fail());
        assert!(!result.passed);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_tag_concatenation_skips_empty() {
        let mut result = WorkerResult::new(0);
        result.record_iteration(IterationOutcome::pass().with_tag("a"));
        result.record_iteration(IterationOutcome::pass().with_tag(""));
        result.record_iteration(IterationOutcome::pass().with_tag("b"));

        assert_eq!(result.log_tag.as_deref(), Some("a b"));
    }

    #[test]
    fn test_aggregate_sums_and_ands() {
        let workers = vec![
            passing_worker(0, 10, Some(1000)),
            passing_worker(1, 10, Some(1000)),
            passing_worker(2, 10, Some(1000)),
        ];
        let aggregate = AggregateResult::from_workers(&workers);

        assert!(aggregate.passed);
        assert_eq!(aggregate.worker_count, 3);
        assert_eq!(aggregate.iterations, 30);
        assert_eq!(aggregate.bytes_moved, Some(3000));
        assert!(aggregate.warnings.is_empty());
    }

    #[test]
    fn test_aggregate_single_failure_fails_run() {
        let mut failed = passing_worker(1, 2, Some(100));
        failed.record_failure(&anyhow::anyhow!("checksum mismatch"));

        let workers = vec![passing_worker(0, 10, Some(100)), failed];
        let aggregate = AggregateResult::from_workers(&workers);

        assert!(!aggregate.passed);
        assert_eq!(aggregate.iterations, 13);
        assert_eq!(aggregate.failures.len(), 1);
        assert_eq!(aggregate.failures[0].worker, Some(1));
    }

    #[test]
    fn test_aggregate_failures_in_worker_index_order() {
        let mut w0 = WorkerResult::new(0);
        w0.record_failure(&anyhow::anyhow!("first"));
        let mut w2 = WorkerResult::new(2);
        w2.record_failure(&anyhow::anyhow!("second"));

        let aggregate = AggregateResult::from_workers(&[w0, passing_worker(1, 1, None), w2]);
        let workers: Vec<_> = aggregate.failures.iter().map(|f| f.worker).collect();
        assert_eq!(workers, vec![Some(0), Some(2)]);
    }

    #[test]
    fn test_aggregate_tags_carry_worker_prefix() {
        let mut w0 = WorkerResult::new(0);
        w0.record_iteration(IterationOutcome::pass().with_tag("t"));
        let mut w1 = WorkerResult::new(1);
        w1.record_iteration(IterationOutcome::pass().with_tag("t"));

        let aggregate = AggregateResult::from_workers(&[w0, w1]);
        assert_eq!(aggregate.log_tag.as_deref(), Some("w0:t w1:t"));
    }

    #[test]
    fn test_aggregate_warns_on_mixed_measurement() {
        let workers = vec![passing_worker(0, 5, Some(10)), passing_worker(1, 5, None)];
        let aggregate = AggregateResult::from_workers(&workers);

        assert_eq!(aggregate.bytes_moved, Some(50));
        assert_eq!(aggregate.warnings.len(), 1);
        assert!(aggregate.warnings[0].contains("1 of 2"));
    }

    #[test]
    fn test_aggregate_idle_workers_do_not_warn() {
        // A worker with zero iterations never measured anything; that is
        // not a measurement mismatch.
        let workers = vec![passing_worker(0, 5, Some(10)), passing_worker(1, 0, None)];
        let aggregate = AggregateResult::from_workers(&workers);
        assert!(aggregate.warnings.is_empty());
    }

    #[test]
    fn test_aggregate_of_empty_is_vacuously_passed() {
        let aggregate = AggregateResult::from_workers(&[]);
        assert!(aggregate.passed);
        assert_eq!(aggregate.iterations, 0);
        assert_eq!(aggregate.bytes_moved, None);
    }
}
