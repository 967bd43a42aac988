//! YAML load-scenario parser and executor
//!
//! Describes a complete load run in a small YAML document: worker count,
//! termination policy and the shape of the synthetic transfer.
//!
//! ## Example Scenario
//!
//! ```yaml
//! name: "nightly soak"
//! description: "4 workers, 1 GiB streams, hash-verified"
//! seed: 42
//! load:
//!   workers: 4
//!   iterations: 10
//! transfer:
//!   target_size: 1073741824
//!   buffer_capacity: 1048576
//!   cycle_on_wrap: true
//!   verify_hash: true
//! ```

pub mod executor;
pub mod parser;

pub use executor::{ExecutionReport, ScenarioExecutor};
pub use parser::{parse_scenario, LoadScenario, ScenarioError};
