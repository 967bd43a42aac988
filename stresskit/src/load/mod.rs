//! Concurrent load-test driver.
//!
//! Runs an arbitrary unit of work ([`Task`]) across a fixed set of
//! concurrent workers under a termination policy, and deterministically
//! aggregates pass/fail state, byte counters and failures across workers.
//! Task failures never escape a worker: they are captured into the worker's
//! result and stop only that worker's loop.

pub mod driver;
pub mod result;
pub mod worker;

pub use driver::{run_load, LoadDriver, LoadDriverBuilder};
pub use result::{AggregateResult, FailureRecord, IterationOutcome, WorkerResult};
pub use worker::LoadWorker;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Duration;

/// A repeatable unit of work driven by the load harness.
///
/// Implementations are supplied by callers; the driver only sees this
/// trait. The task definition is shared read-only across all workers of a
/// run, so implementations keep per-call state internal (atomics or locks).
#[async_trait]
pub trait Task: Send + Sync {
    /// Executes one iteration of the work.
    ///
    /// Returns the iteration's outcome, or an error describing why the
    /// iteration failed. Errors stop the calling worker's loop but never
    /// propagate past it.
    async fn run_once(&self) -> Result<IterationOutcome>;

    /// Releases any resources held by the task.
    ///
    /// Invoked exactly once per worker lifecycle, after the worker's loop
    /// has finished for any reason. Must be idempotent and must not fail.
    async fn tear_down(&self) {}
}

/// How a worker decides to stop iterating.
///
/// Exactly one policy governs a run. The duration deadline is advisory per
/// iteration: a long-running iteration is not preempted mid-call, the
/// deadline is only checked between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Stop once the given wall-clock duration has elapsed since loop entry.
    ByDuration(Duration),
    /// Stop once the given number of iterations has completed.
    ByIterationCount(u64),
}

/// Configuration errors detected before any work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The driver needs at least one worker.
    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

/// Shared cancellation flag polled by workers between iterations.
///
/// Defaults to "never fire"; a run bounded only by an iteration count or a
/// duration never observes it. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation: workers stop before their next iteration.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
