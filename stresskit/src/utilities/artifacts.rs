// File: stresskit/src/utilities/artifacts.rs
//
// Run Artifact Collection
//
// Captures the state of a finished (usually failed) load run as a JSON
// document: metadata, the aggregate result, and the execution log. Together
// with the logged RNG seed this is enough to reproduce and debug a run.

use crate::load::AggregateResult;
use crate::orchestrator::rng::SEED_ENV_VAR;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Run metadata for reproduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Run or scenario name.
    pub run_name: String,
    /// RNG seed used (if available).
    pub rng_seed: Option<u64>,
    /// RFC3339 timestamp of when the artifact was created.
    pub timestamp: String,
    /// Run duration in milliseconds.
    pub duration_ms: u64,
    /// Failure reason (if available).
    pub failure_reason: Option<String>,
}

/// Complete artifact of one load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifact {
    /// Run metadata.
    pub metadata: RunMetadata,
    /// Aggregate result of the run, when it got far enough to produce one.
    pub result: Option<AggregateResult>,
    /// Execution log lines captured during the run.
    pub logs: Vec<String>,
}

/// Collector that accumulates run state and writes the artifact.
///
/// # Examples
///
/// ```rust,ignore
/// use stresskit::utilities::ArtifactCollector;
///
/// let mut collector = ArtifactCollector::new("nightly_soak");
/// collector.set_rng_seed(0x1234);
/// // ... run the load ...
/// collector.set_result(aggregate);
/// if !passed {
///     collector.set_failure_reason("digest mismatch on worker 2");
///     collector.save("./artifacts/").await?;
/// }
/// ```
pub struct ArtifactCollector {
    metadata: RunMetadata,
    result: Option<AggregateResult>,
    logs: Vec<String>,
    start_time: std::time::Instant,
}

impl ArtifactCollector {
    /// Creates a collector for a named run.
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            metadata: RunMetadata {
                run_name: run_name.into(),
                rng_seed: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
                duration_ms: 0,
                failure_reason: None,
            },
            result: None,
            logs: Vec::new(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Records the RNG seed the run was derived from.
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.metadata.rng_seed = Some(seed);
    }

    /// Records why the run failed.
    pub fn set_failure_reason(&mut self, reason: impl Into<String>) {
        self.metadata.failure_reason = Some(reason.into());
    }

    /// Attaches the aggregate result of the run.
    pub fn set_result(&mut self, result: AggregateResult) {
        self.result = Some(result);
    }

    /// Appends a log line to the artifact.
    pub fn record_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    /// Writes the artifact as JSON under `dir`, returning the file path.
    pub async fn save(&mut self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.metadata.duration_ms = self.start_time.elapsed().as_millis() as u64;

        let artifact = RunArtifact {
            metadata: self.metadata.clone(),
            result: self.result.clone(),
            logs: self.logs.clone(),
        };

        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating artifact directory {:?}", dir))?;

        let filename = format!(
            "{}_{}.json",
            sanitize(&self.metadata.run_name),
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        let filepath = dir.join(filename);

        let json = serde_json::to_string_pretty(&artifact)?;
        let mut file = fs::File::create(&filepath)
            .await
            .with_context(|| format!("creating artifact file {:?}", filepath))?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;

        log::info!("run artifact saved: {:?}", filepath);
        Ok(filepath)
    }

    /// Loads an artifact previously written by [`ArtifactCollector::save`].
    pub async fn load(filepath: impl AsRef<Path>) -> Result<RunArtifact> {
        let filepath = filepath.as_ref();
        let json = fs::read_to_string(filepath)
            .await
            .with_context(|| format!("reading artifact {:?}", filepath))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parsing artifact {:?}", filepath))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Returns the shell command that replays the run with the same seed.
pub fn replay_command(artifact: &RunArtifact) -> String {
    if let Some(seed) = artifact.metadata.rng_seed {
        format!(
            "{}={:#x} cargo test {}",
            SEED_ENV_VAR, seed, artifact.metadata.run_name
        )
    } else {
        format!("cargo test {}", artifact.metadata.run_name)
    }
}

/// Prints a human-readable artifact summary to stdout.
pub fn print_run_summary(artifact: &RunArtifact) {
    let line = "=".repeat(64);
    println!("{}", line);
    println!("RUN ARTIFACT: {}", artifact.metadata.run_name);
    println!("{}", line);
    println!("Timestamp:  {}", artifact.metadata.timestamp);
    println!("Duration:   {} ms", artifact.metadata.duration_ms);
    match artifact.metadata.rng_seed {
        Some(seed) => println!("RNG seed:   {:#018x}", seed),
        None => println!("RNG seed:   n/a"),
    }

    if let Some(reason) = &artifact.metadata.failure_reason {
        println!("{}", line);
        println!("FAILURE REASON:");
        for wrapped in textwrap::wrap(reason, 60) {
            println!("  {}", wrapped);
        }
    }

    if let Some(result) = &artifact.result {
        println!("{}", line);
        println!(
            "Result:     passed={} workers={} iterations={}",
            result.passed, result.worker_count, result.iterations
        );
        match result.bytes_moved {
            Some(bytes) => println!("Bytes:      {}", bytes),
            None => println!("Bytes:      not measured"),
        }
        if !result.failures.is_empty() {
            println!("Failures:   {}", result.failures.len());
            for failure in result.failures.iter().take(5) {
                println!(
                    "  worker {:?} iteration {}: {}",
                    failure.worker, failure.iteration, failure.message
                );
            }
        }
        for warning in &result.warnings {
            println!("Warning:    {}", warning);
        }
    }

    if !artifact.logs.is_empty() {
        println!("{}", line);
        println!("RECENT LOGS (last 5):");
        for log_line in artifact.logs.iter().rev().take(5).rev() {
            println!("  {}", log_line);
        }
    }

    println!("{}", line);
    println!("REPLAY: {}", replay_command(artifact));
    println!("{}", line);
}
