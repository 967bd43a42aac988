//! YAML scenario format and validation.

use crate::channel::DEFAULT_BUFFER_CAPACITY;
use crate::load::TerminationPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;

/// Errors produced while parsing or validating a scenario document.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The document is not valid YAML for the scenario schema.
    #[error("invalid scenario document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Neither `iterations` nor `duration_ms` was given.
    #[error("scenario {0:?} has no termination policy (set iterations or duration_ms)")]
    MissingPolicy(String),

    /// Both `iterations` and `duration_ms` were given.
    #[error("scenario {0:?} sets both iterations and duration_ms; pick one")]
    ConflictingPolicy(String),

    /// Worker count is zero.
    #[error("scenario {0:?} needs at least one worker")]
    ZeroWorkers(String),

    /// Buffer capacity is zero.
    #[error("scenario {0:?} has a zero buffer capacity")]
    ZeroBufferCapacity(String),
}

/// A parsed and validated load scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadScenario {
    /// Scenario name, used in logs and artifacts.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Base seed for the synthetic streams; a random one is drawn if unset.
    #[serde(default)]
    pub seed: Option<i64>,
    /// Worker pool and termination policy.
    pub load: LoadSection,
    /// Shape of the synthetic transfer each iteration performs.
    pub transfer: TransferSection,
}

/// Worker pool and termination policy of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSection {
    /// Number of concurrent workers.
    pub workers: u32,
    /// Stop each worker after this many iterations.
    #[serde(default)]
    pub iterations: Option<u64>,
    /// Stop each worker after this much wall-clock time.
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// Synthetic transfer parameters of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSection {
    /// Bytes each iteration moves through the channel pair.
    pub target_size: u64,
    /// In-memory buffer capacity for the read channel.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: u32,
    /// Reseed the stream buffer on every wrap.
    #[serde(default = "default_true")]
    pub cycle_on_wrap: bool,
    /// Verify the received digest against the recomputed expectation.
    #[serde(default = "default_true")]
    pub verify_hash: bool,
}

fn default_buffer_capacity() -> u32 {
    DEFAULT_BUFFER_CAPACITY
}

fn default_true() -> bool {
    true
}

impl LoadScenario {
    /// The termination policy this scenario's workers run under.
    ///
    /// # Panics
    ///
    /// Panics if the scenario does not define exactly one policy. Scenarios
    /// produced by [`parse_scenario`] are always valid; this only concerns
    /// hand-constructed values.
    pub fn policy(&self) -> TerminationPolicy {
        match (self.load.iterations, self.load.duration_ms) {
            (Some(count), None) => TerminationPolicy::ByIterationCount(count),
            (None, Some(ms)) => TerminationPolicy::ByDuration(Duration::from_millis(ms)),
            _ => panic!("scenario must define exactly one of iterations or duration_ms"),
        }
    }

    fn validate(self) -> Result<Self, ScenarioError> {
        match (self.load.iterations, self.load.duration_ms) {
            (None, None) => return Err(ScenarioError::MissingPolicy(self.name)),
            (Some(_), Some(_)) => return Err(ScenarioError::ConflictingPolicy(self.name)),
            _ => {}
        }
        if self.load.workers == 0 {
            return Err(ScenarioError::ZeroWorkers(self.name));
        }
        if self.transfer.buffer_capacity == 0 {
            return Err(ScenarioError::ZeroBufferCapacity(self.name));
        }
        Ok(self)
    }
}

/// Parses a YAML scenario document and validates it.
pub fn parse_scenario(yaml: &str) -> Result<LoadScenario, ScenarioError> {
    let scenario: LoadScenario = serde_yaml::from_str(yaml)?;
    scenario.validate()
}
