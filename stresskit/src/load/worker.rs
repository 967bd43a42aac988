//! Single load worker: sequential iteration loop under a termination policy.

use super::result::WorkerResult;
use super::{CancelFlag, Task, TerminationPolicy};
use crate::orchestrator::Clock;
use std::sync::Arc;

/// Executes a task repeatedly, accumulating a private [`WorkerResult`].
///
/// State machine: IDLE until [`LoadWorker::run`] is called, RUNNING while
/// looping, DONE once the result is returned. Iterations within a worker
/// are strictly sequential; nothing is ordered between sibling workers.
///
/// `run` never lets a task failure escape: the first failing iteration is
/// recorded, the loop stops (fail-fast), and the task's teardown hook still
/// runs exactly once.
pub struct LoadWorker {
    id: usize,
    clock: Arc<dyn Clock>,
    cancel: CancelFlag,
}

impl LoadWorker {
    /// Creates a worker with the given index, clock and cancellation flag.
    pub fn new(id: usize, clock: Arc<dyn Clock>, cancel: CancelFlag) -> Self {
        Self { id, clock, cancel }
    }

    /// Index of this worker within its driver run.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs the task under the policy until termination, failure or
    /// cancellation, then tears the task down and returns the result.
    ///
    /// The duration deadline is computed once at loop entry and checked
    /// between iterations only; a long-running iteration is never preempted
    /// mid-call.
    pub async fn run(&self, task: Arc<dyn Task>, policy: TerminationPolicy) -> WorkerResult {
        let mut result = WorkerResult::new(self.id);

        let deadline = match policy {
            TerminationPolicy::ByDuration(d) => Some(self.clock.now() + d),
            TerminationPolicy::ByIterationCount(_) => None,
        };

        log::debug!("worker {} starting: {:?}", self.id, policy);

        loop {
            // Deadline fixed at loop entry; only checked between iterations
            if let Some(deadline) = deadline {
                if self.clock.now() >= deadline {
                    break;
                }
            }
            if let TerminationPolicy::ByIterationCount(count) = policy {
                if result.iterations >= count {
                    break;
                }
            }

            if self.cancel.is_cancelled() {
                log::debug!(
                    "worker {} cancelled after {} iterations",
                    self.id,
                    result.iterations
                );
                break;
            }

            match task.run_once().await {
                Ok(outcome) => result.record_iteration(outcome),
                Err(error) => {
                    log::warn!(
                        "worker {} iteration {} failed: {:#}",
                        self.id,
                        result.iterations + 1,
                        error
                    );
                    result.record_failure(&error);
                    break;
                }
            }
        }

        task.tear_down().await;

        log::debug!(
            "worker {} done: passed={} iterations={} bytes={:?}",
            self.id,
            result.passed,
            result.iterations,
            result.bytes_moved
        );

        result
    }
}
