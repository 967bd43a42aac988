//! Reference tasks for driving the synthetic channels under load.
//!
//! The harness treats tasks as opaque units of work; these two are the
//! in-tree implementations. [`SyntheticTransferTask`] pumps a synthetic
//! source into a hashing sink and verifies the transfer end to end, which
//! is the standard integrity workload. [`FnTask`] adapts a closure, mostly
//! for tests.

use crate::channel::{expected_digest, SyntheticReadChannel, SyntheticWriteChannel};
use crate::load::{IterationOutcome, Task};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default pump-buffer size for transfers (64 KiB).
const DEFAULT_COPY_LEN: usize = 64 * 1024;

/// Task that moves a reproducible synthetic stream from a read channel into
/// a hashing write channel and verifies byte accounting and content digest.
///
/// Each iteration uses `base_seed + iteration` as its channel seed, so
/// repeated iterations exercise distinct streams while the whole run stays
/// reproducible from the base seed alone.
pub struct SyntheticTransferTask {
    base_seed: i64,
    target_size: u64,
    buffer_capacity: u32,
    cycle_on_wrap: bool,
    verify_hash: bool,
    copy_len: usize,
    log_tag: Option<String>,
    iterations_started: AtomicU64,
}

impl SyntheticTransferTask {
    /// Creates a transfer task with the default buffer capacity, cyclic
    /// reseeding and hash verification enabled.
    pub fn new(base_seed: i64, target_size: u64) -> Self {
        Self {
            base_seed,
            target_size,
            buffer_capacity: crate::channel::DEFAULT_BUFFER_CAPACITY,
            cycle_on_wrap: true,
            verify_hash: true,
            copy_len: DEFAULT_COPY_LEN,
            log_tag: None,
            iterations_started: AtomicU64::new(0),
        }
    }

    /// Sets the channel buffer capacity.
    pub fn with_buffer_capacity(mut self, buffer_capacity: u32) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    /// Enables or disables buffer reseeding on wrap.
    pub fn with_cycle_on_wrap(mut self, cycle_on_wrap: bool) -> Self {
        self.cycle_on_wrap = cycle_on_wrap;
        self
    }

    /// Enables or disables digest verification of the transferred bytes.
    pub fn with_verify_hash(mut self, verify_hash: bool) -> Self {
        self.verify_hash = verify_hash;
        self
    }

    /// Sets the pump-buffer size used to move bytes between the channels.
    pub fn with_copy_len(mut self, copy_len: usize) -> Self {
        self.copy_len = copy_len.max(1);
        self
    }

    /// Tags every iteration outcome with the given log tag.
    pub fn with_log_tag(mut self, tag: impl Into<String>) -> Self {
        self.log_tag = Some(tag.into());
        self
    }
}

#[async_trait]
impl Task for SyntheticTransferTask {
    async fn run_once(&self) -> Result<IterationOutcome> {
        let iteration = self.iterations_started.fetch_add(1, Ordering::SeqCst);
        let seed = self.base_seed.wrapping_add(iteration as i64);

        let mut source =
            SyntheticReadChannel::new(seed, self.target_size, self.buffer_capacity, self.cycle_on_wrap);
        let mut sink = SyntheticWriteChannel::new(self.target_size, self.verify_hash);

        let mut buf = vec![0u8; self.copy_len];
        while let Some(n) = source.read(&mut buf) {
            if n == 0 {
                continue;
            }
            let mut written = 0;
            while written < n {
                match sink.write(&buf[written..n]) {
                    Some(consumed) => written += consumed,
                    None => bail!(
                        "sink stopped accepting bytes at {} of {}",
                        sink.state().bytes_moved(),
                        self.target_size
                    ),
                }
            }
        }

        let moved = sink.state().bytes_moved();
        if moved != self.target_size {
            bail!(
                "transfer incomplete: moved {} of {} bytes",
                moved,
                self.target_size
            );
        }

        let mut passed = true;
        if self.verify_hash {
            let expected =
                expected_digest(seed, self.target_size, self.buffer_capacity, self.cycle_on_wrap);
            if sink.digest() != Some(&expected) {
                log::warn!(
                    "digest mismatch on seed {:#x}: got {:?}",
                    seed,
                    sink.digest_hex()
                );
                passed = false;
            }
        }

        let mut outcome = if passed {
            IterationOutcome::pass()
        } else {
            IterationOutcome::fail()
        }
        .with_bytes(moved);
        if let Some(tag) = &self.log_tag {
            outcome = outcome.with_tag(tag.clone());
        }
        Ok(outcome)
    }
}

/// Adapter turning a closure into a [`Task`].
///
/// The closure receives a 0-based call counter shared across all workers
/// using the task. Useful for tests and ad-hoc workloads.
///
/// # Examples
///
/// ```rust,ignore
/// use stresskit::tasks::FnTask;
/// use stresskit::load::IterationOutcome;
///
/// let task = FnTask::new(|call| {
///     Ok(IterationOutcome::pass().with_tag(format!("call-{}", call)))
/// });
/// ```
pub struct FnTask<F> {
    f: F,
    calls: AtomicU64,
}

impl<F> FnTask<F>
where
    F: Fn(u64) -> Result<IterationOutcome> + Send + Sync,
{
    /// Wraps a closure as a task.
    pub fn new(f: F) -> Self {
        Self {
            f,
            calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl<F> Task for FnTask<F>
where
    F: Fn(u64) -> Result<IterationOutcome> + Send + Sync,
{
    async fn run_once(&self) -> Result<IterationOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(call)
    }
}
