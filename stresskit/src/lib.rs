//! # Stresskit
//!
//! Synthetic-load and data-integrity stress harness for storage clusters.
//!
//! ## Architecture Overview
//!
//! Two core pieces, plus deterministic infrastructure around them:
//!
//! - **Synthetic channels** ([`channel`]): bounded-memory byte sources and
//!   sinks that emulate arbitrarily large data streams. Content is
//!   reproducible from a seed, chunking-invariant, and verifiable through
//!   an incremental digest on the receiving side.
//! - **Load driver** ([`load`]): runs an arbitrary [`load::Task`] across a
//!   fixed pool of concurrent workers under a duration or iteration-count
//!   policy, and deterministically aggregates pass/fail state, byte
//!   counters and captured failures.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stresskit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1 GiB hash-verified transfers, 4 workers, 10 iterations each
//!     let task = Arc::new(SyntheticTransferTask::new(42, 1 << 30));
//!     let driver = LoadDriver::builder().with_workers(4).build()?;
//!     let aggregate = driver
//!         .run(task, TerminationPolicy::ByIterationCount(10))
//!         .await;
//!
//!     assert!(aggregate.passed);
//!     Ok(())
//! }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: seeded streams, seeded RNG, injectable clock
//! 2. **Bounded memory**: channels never hold more than their buffer
//! 3. **Failures are data**: task errors land in results, not panics
//! 4. **Reproducible reports**: aggregation is serialized in worker order
//!
//! ## Features
//!
//! - **default**: channels, driver, scenarios, artifacts
//! - **chaos**: fault injection and property-based tests

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Synthetic byte-stream channels (sources and sinks)
pub mod channel;

/// Concurrent load driver: tasks, workers, aggregation
pub mod load;

/// Core orchestration - deterministic clock and RNG
pub mod orchestrator;

/// YAML scenario parser and executor
pub mod scenarios;

/// Reference tasks built on the synthetic channels
pub mod tasks;

/// Shared utilities (run artifacts, summaries)
pub mod utilities;

// Chaos helpers and property tests
#[cfg(feature = "chaos")]
pub mod chaos;

// Convenient re-exports for common usage
pub mod prelude;

// Re-export commonly used types at crate root
pub use channel::{SyntheticReadChannel, SyntheticWriteChannel};
pub use load::{AggregateResult, LoadDriver, Task, TerminationPolicy};
pub use orchestrator::{Clock, PausedClock, SystemClock, TestEnv, TestRng};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Harness version descriptor
pub const HARNESS_VERSION: &str = "Stresskit Harness V1.0";
