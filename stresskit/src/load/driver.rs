//! Load driver: fans a task out across concurrent workers and aggregates.

use super::result::{AggregateResult, WorkerResult};
use super::worker::LoadWorker;
use super::{CancelFlag, ConfigError, Task, TerminationPolicy};
use crate::orchestrator::{Clock, SystemClock};
use futures::future::join_all;
use std::sync::Arc;

/// Stateless orchestrator for a fixed-size pool of [`LoadWorker`]s.
///
/// Spawns one tokio task per worker, waits for every worker to finish
/// (barrier: no partial aggregation while any worker is still running),
/// then merges the private per-worker results in worker-index order.
/// Workers never share mutable state; the aggregate is written exactly
/// once, after the join barrier.
///
/// # Examples
///
/// ```rust,ignore
/// use stresskit::load::{LoadDriver, TerminationPolicy};
/// use stresskit::tasks::SyntheticTransferTask;
/// use std::sync::Arc;
///
/// let driver = LoadDriver::builder().with_workers(4).build()?;
/// let task = Arc::new(SyntheticTransferTask::new(42, 1 << 20));
/// let aggregate = driver
///     .run(task, TerminationPolicy::ByIterationCount(10))
///     .await;
/// assert!(aggregate.passed);
/// ```
pub struct LoadDriver {
    worker_count: u32,
    clock: Arc<dyn Clock>,
    cancel: CancelFlag,
}

impl std::fmt::Debug for LoadDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadDriver")
            .field("worker_count", &self.worker_count)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl LoadDriver {
    /// Starts building a driver.
    pub fn builder() -> LoadDriverBuilder {
        LoadDriverBuilder::new()
    }

    /// Creates a driver with the given worker count, the system clock and
    /// a cancellation flag that never fires.
    pub fn new(worker_count: u32) -> Result<Self, ConfigError> {
        Self::builder().with_workers(worker_count).build()
    }

    /// Number of workers this driver spawns per run.
    pub fn worker_count(&self) -> u32 {
        self.worker_count
    }

    /// Runs `task` across all workers under `policy` and aggregates.
    ///
    /// A worker task that panics is folded into the aggregate as a failed
    /// worker rather than propagating the panic.
    pub async fn run(&self, task: Arc<dyn Task>, policy: TerminationPolicy) -> AggregateResult {
        log::info!(
            "starting load run: {} workers, {:?}",
            self.worker_count,
            policy
        );

        let mut handles = Vec::with_capacity(self.worker_count as usize);
        for id in 0..self.worker_count as usize {
            let worker = LoadWorker::new(id, self.clock.clone(), self.cancel.clone());
            let task = task.clone();
            handles.push(tokio::spawn(
                async move { worker.run(task, policy).await },
            ));
        }

        // Barrier: every worker reaches DONE before any aggregation
        let joined = join_all(handles).await;

        let results: Vec<WorkerResult> = joined
            .into_iter()
            .enumerate()
            .map(|(id, join_result)| match join_result {
                Ok(result) => result,
                Err(join_error) => {
                    log::error!("worker {} task panicked: {}", id, join_error);
                    let mut result = WorkerResult::new(id);
                    result.record_failure(&anyhow::anyhow!(
                        "worker task panicked: {}",
                        join_error
                    ));
                    result
                }
            })
            .collect();

        let aggregate = AggregateResult::from_workers(&results);

        log::info!(
            "load run finished: passed={} iterations={} bytes={:?} failures={}",
            aggregate.passed,
            aggregate.iterations,
            aggregate.bytes_moved,
            aggregate.failures.len()
        );

        aggregate
    }
}

/// Builder for [`LoadDriver`], with injectable clock and cancellation flag.
pub struct LoadDriverBuilder {
    worker_count: u32,
    clock: Option<Arc<dyn Clock>>,
    cancel: Option<CancelFlag>,
}

impl LoadDriverBuilder {
    /// Creates a builder with a single worker and the system clock.
    pub fn new() -> Self {
        Self {
            worker_count: 1,
            clock: None,
            cancel: None,
        }
    }

    /// Sets the number of concurrent workers.
    pub fn with_workers(mut self, worker_count: u32) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Injects a clock (a paused clock in tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Shares a cancellation flag with the driver's workers.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validates the configuration and builds the driver.
    ///
    /// Configuration errors surface here, before any work starts.
    pub fn build(self) -> Result<LoadDriver, ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(LoadDriver {
            worker_count: self.worker_count,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for LoadDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper: build a driver and run one load in a single call.
pub async fn run_load(
    task: Arc<dyn Task>,
    policy: TerminationPolicy,
    worker_count: u32,
) -> Result<AggregateResult, ConfigError> {
    let driver = LoadDriver::new(worker_count)?;
    Ok(driver.run(task, policy).await)
}
