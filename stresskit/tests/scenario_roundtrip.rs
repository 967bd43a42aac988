//! Scenario DSL and artifact pipeline, end to end.

use stresskit::prelude::*;
use stresskit::utilities::ArtifactCollector;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const SMOKE_SCENARIO: &str = r#"
name: "smoke"
description: "two workers, small hash-verified transfers"
seed: 1234
load:
  workers: 2
  iterations: 4
transfer:
  target_size: 32768
  buffer_capacity: 4096
"#;

#[tokio::test]
async fn test_scenario_executes_and_reports() {
    init_logging();

    let scenario = parse_scenario(SMOKE_SCENARIO).unwrap();
    let mut executor = ScenarioExecutor::new();
    let report = executor.execute(scenario).await.unwrap();

    assert!(report.success);
    assert_eq!(report.scenario_name, "smoke");
    assert_eq!(report.seed, 1234);
    assert_eq!(report.result.iterations, 8);
    assert_eq!(report.result.bytes_moved, Some(8 * 32768));
    assert!(!report.log.is_empty());
}

#[tokio::test]
async fn test_scenario_report_lands_in_artifact() {
    init_logging();

    let scenario = parse_scenario(SMOKE_SCENARIO).unwrap();
    let report = ScenarioExecutor::new().execute(scenario).await.unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let mut collector = ArtifactCollector::new(report.scenario_name.clone());
    collector.set_rng_seed(report.seed as u64);
    for line in &report.log {
        collector.record_log(line.clone());
    }
    collector.set_result(report.result.clone());

    let filepath = collector.save(temp_dir.path()).await.unwrap();
    let loaded = ArtifactCollector::load(&filepath).await.unwrap();

    assert_eq!(loaded.metadata.run_name, "smoke");
    let result = loaded.result.unwrap();
    assert!(result.passed);
    assert_eq!(result.iterations, 8);

    // Rendering must never panic on a real artifact
    print_run_summary(&RunArtifact {
        metadata: loaded.metadata,
        result: Some(result),
        logs: loaded.logs,
    });
}

#[tokio::test]
async fn test_scenario_with_duration_policy() {
    init_logging();

    let scenario = parse_scenario(
        r#"
name: "short burst"
load:
  workers: 2
  duration_ms: 50
transfer:
  target_size: 1024
  buffer_capacity: 256
"#,
    )
    .unwrap();

    let report = ScenarioExecutor::new().execute(scenario).await.unwrap();

    // Real clock, so only coarse assertions: it terminated and passed.
    assert!(report.success);
}

#[test]
fn test_invalid_scenarios_are_rejected_up_front() {
    assert!(parse_scenario("name: \"x\"").is_err());

    let both_policies = r#"
name: "x"
load:
  workers: 1
  iterations: 1
  duration_ms: 1
transfer:
  target_size: 1
"#;
    assert!(parse_scenario(both_policies).is_err());
}
