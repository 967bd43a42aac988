//! Chaos & Property-Based Testing
//!
//! Fault-injection helpers and randomized property tests for the channels
//! and the load driver. Everything here is deterministic: fault schedules
//! are seeded, and failed property runs can be replayed from the printed
//! seed (`STRESSKIT_SEED=0x... cargo test --features chaos`).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod property_tests;

use crate::load::{IterationOutcome, Task};
use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// When a [`FaultInjector`] fails an iteration.
#[derive(Debug, Clone, Copy)]
pub enum FaultSchedule {
    /// Never inject a fault (pass-through).
    Never,
    /// Fail exactly the given 1-based call.
    OnCall(u64),
    /// Fail each call with the given probability, drawn from a seeded
    /// stream so the schedule is reproducible.
    WithProbability {
        /// Per-call failure probability in `[0, 1]`.
        p: f64,
        /// Seed for the decision stream.
        seed: u64,
    },
}

/// Task wrapper that injects failures according to a schedule.
///
/// Injected failures look exactly like task-level failures, which is the
/// point: they drive the worker's fail-fast path and the driver's
/// aggregation of partial results without needing a flaky real workload.
pub struct FaultInjector<T> {
    inner: T,
    schedule: FaultSchedule,
    calls: AtomicU64,
    decisions: Mutex<ChaCha8Rng>,
}

impl<T: Task> FaultInjector<T> {
    /// Wraps `inner` with the given fault schedule.
    pub fn new(inner: T, schedule: FaultSchedule) -> Self {
        let seed = match schedule {
            FaultSchedule::WithProbability { seed, .. } => seed,
            _ => 0,
        };
        Self {
            inner,
            schedule,
            calls: AtomicU64::new(0),
            decisions: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn should_fail(&self, call: u64) -> bool {
        match self.schedule {
            FaultSchedule::Never => false,
            FaultSchedule::OnCall(n) => call == n,
            FaultSchedule::WithProbability { p, .. } => self.decisions.lock().gen_bool(p),
        }
    }
}

#[async_trait]
impl<T: Task> Task for FaultInjector<T> {
    async fn run_once(&self) -> Result<IterationOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.should_fail(call) {
            bail!("injected fault on call {}", call);
        }
        self.inner.run_once().await
    }

    async fn tear_down(&self) {
        self.inner.tear_down().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::FnTask;

    fn passthrough() -> FnTask<impl Fn(u64) -> Result<IterationOutcome> + Send + Sync> {
        FnTask::new(|_| Ok(IterationOutcome::pass()))
    }

    #[tokio::test]
    async fn test_never_schedule_passes_through() {
        let task = FaultInjector::new(passthrough(), FaultSchedule::Never);
        for _ in 0..10 {
            assert!(task.run_once().await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_on_call_fails_exactly_once() {
        let task = FaultInjector::new(passthrough(), FaultSchedule::OnCall(3));

        assert!(task.run_once().await.is_ok());
        assert!(task.run_once().await.is_ok());
        assert!(task.run_once().await.is_err());
        assert!(task.run_once().await.is_ok());
    }

    #[tokio::test]
    async fn test_probability_schedule_is_deterministic() {
        let outcomes = |seed| async move {
            let task = FaultInjector::new(
                passthrough(),
                FaultSchedule::WithProbability { p: 0.5, seed },
            );
            let mut results = Vec::new();
            for _ in 0..20 {
                results.push(task.run_once().await.is_ok());
            }
            results
        };

        assert_eq!(outcomes(42).await, outcomes(42).await);
    }
}
