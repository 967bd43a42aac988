//! Convenient re-exports for common harness usage.
//!
//! ```rust,ignore
//! use stresskit::prelude::*;
//! ```

pub use crate::channel::{
    expected_digest, SyntheticReadChannel, SyntheticWriteChannel, WriteStatus,
};
pub use crate::load::{
    run_load, AggregateResult, CancelFlag, ConfigError, FailureRecord, IterationOutcome,
    LoadDriver, LoadDriverBuilder, LoadWorker, Task, TerminationPolicy, WorkerResult,
};
pub use crate::orchestrator::{Clock, PausedClock, SystemClock, TestEnv, TestRng};
pub use crate::scenarios::{parse_scenario, ExecutionReport, LoadScenario, ScenarioExecutor};
pub use crate::tasks::{FnTask, SyntheticTransferTask};
pub use crate::utilities::{print_run_summary, replay_command, ArtifactCollector, RunArtifact};

#[cfg(feature = "chaos")]
pub use crate::chaos::{FaultInjector, FaultSchedule};

// Common externals used alongside the harness
pub use std::sync::Arc;
pub use tokio::time::Duration;
