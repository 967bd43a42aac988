//! Scenario execution engine
//!
//! Turns a parsed [`LoadScenario`] into a driver run: builds the synthetic
//! transfer task, spawns the worker pool, and reduces the aggregate into an
//! [`ExecutionReport`] suitable for logging or archiving.

use super::parser::LoadScenario;
use crate::load::{AggregateResult, LoadDriver, Task};
use crate::tasks::SyntheticTransferTask;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of one scenario execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Name of the executed scenario.
    pub scenario_name: String,
    /// Whether every worker and every iteration passed.
    pub success: bool,
    /// Seed the synthetic streams were derived from.
    pub seed: i64,
    /// Full aggregate produced by the driver.
    pub result: AggregateResult,
    /// Execution log collected while running.
    pub log: Vec<String>,
}

/// Executes parsed load scenarios.
pub struct ScenarioExecutor {
    log: Vec<String>,
}

impl ScenarioExecutor {
    /// Creates a new executor.
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    /// Executes a scenario to completion.
    ///
    /// # Errors
    ///
    /// Returns an error for configuration problems (driver construction);
    /// load failures do not error, they are reported via
    /// [`ExecutionReport::success`].
    pub async fn execute(&mut self, scenario: LoadScenario) -> Result<ExecutionReport> {
        self.log.clear();

        self.log(format!("Starting scenario: {}", scenario.name));
        if let Some(desc) = &scenario.description {
            self.log(format!("Description: {}", desc));
        }

        let seed = scenario.seed.unwrap_or_else(|| rand::random());
        self.log(format!("Stream seed: {:#x}", seed));

        let transfer = &scenario.transfer;
        let task = SyntheticTransferTask::new(seed, transfer.target_size)
            .with_buffer_capacity(transfer.buffer_capacity)
            .with_cycle_on_wrap(transfer.cycle_on_wrap)
            .with_verify_hash(transfer.verify_hash);
        let task: Arc<dyn Task> = Arc::new(task);

        let driver = LoadDriver::builder()
            .with_workers(scenario.load.workers)
            .build()
            .with_context(|| format!("building driver for scenario {:?}", scenario.name))?;

        let policy = scenario.policy();
        self.log(format!(
            "Running {} workers under {:?}",
            scenario.load.workers, policy
        ));

        let result = driver.run(task, policy).await;

        self.log(format!(
            "Workers done: passed={} iterations={} bytes={:?}",
            result.passed, result.iterations, result.bytes_moved
        ));
        for failure in &result.failures {
            self.log(format!(
                "Failure (worker {:?}, iteration {}): {}",
                failure.worker, failure.iteration, failure.message
            ));
        }
        for warning in &result.warnings {
            self.log(format!("Warning: {}", warning));
        }

        let success = result.passed;
        if success {
            self.log("=== Scenario completed successfully ===".to_string());
        } else {
            self.log("=== Scenario FAILED ===".to_string());
        }

        Ok(ExecutionReport {
            scenario_name: scenario.name,
            success,
            seed,
            result,
            log: self.log.clone(),
        })
    }

    fn log(&mut self, line: String) {
        log::info!("{}", line);
        self.log.push(line);
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::parser::parse_scenario;

    #[tokio::test]
    async fn test_execute_passing_scenario() {
        let scenario = parse_scenario(
            r#"
name: "unit"
seed: 11
load:
  workers: 2
  iterations: 3
transfer:
  target_size: 8192
  buffer_capacity: 1024
"#,
        )
        .unwrap();

        let mut executor = ScenarioExecutor::new();
        let report = executor.execute(scenario).await.unwrap();

        assert!(report.success);
        assert_eq!(report.scenario_name, "unit");
        assert_eq!(report.seed, 11);
        assert_eq!(report.result.iterations, 6);
        assert_eq!(report.result.bytes_moved, Some(6 * 8192));
        assert!(report.log.iter().any(|l| l.contains("completed successfully")));
    }

    #[tokio::test]
    async fn test_execute_draws_seed_when_unset() {
        let scenario = parse_scenario(
            r#"
name: "unit"
load:
  workers: 1
  iterations: 1
transfer:
  target_size: 256
  buffer_capacity: 128
"#,
        )
        .unwrap();

        let report = ScenarioExecutor::new().execute(scenario).await.unwrap();
        assert!(report.success);
    }
}
