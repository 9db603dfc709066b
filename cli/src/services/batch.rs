//! Batch print normalization.
//!
//! Each input is read asynchronously, normalized on the blocking pool and
//! written next to the others in the output directory. A semaphore caps
//! the number of jobs in flight and every job runs under a timeout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use print_normalizer::{ImageSource, NormalizeError, PrintSpec, RenderedAsset};
use serde_json::json;
use tokio::sync::Semaphore;

use crate::config::CliConfig;

/// A single file to normalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Metadata of an asset that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSummary {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub byte_size: usize,
    pub dpi: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Failed to read input: {0}")]
    Read(std::io::Error),

    #[error("Input is not valid UTF-8 text")]
    NotText,

    #[error("{0}")]
    Normalize(#[from] NormalizeError),

    #[error("Failed to write output: {0}")]
    Write(std::io::Error),

    #[error("Timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Output {} is already written by {}", .output.display(), .first_input.display())]
    OutputTaken { output: PathBuf, first_input: PathBuf },
}

impl JobError {
    /// Short category for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read(_) | Self::NotText => "read",
            Self::Normalize(e) => e.kind().as_str(),
            Self::Write(_) => "write",
            Self::TimedOut(_) => "timeout",
            Self::Worker(_) => "worker",
            Self::OutputTaken { .. } => "output_taken",
        }
    }

    /// True when the input file itself is at fault. Everything else points at
    /// the batch configuration or the environment.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Read(_) | Self::NotText => true,
            Self::Normalize(e) => e.is_input_error(),
            _ => false,
        }
    }
}

/// Result of one job.
#[derive(Debug)]
pub struct JobOutcome {
    pub job: PrintJob,
    pub result: Result<AssetSummary, JobError>,
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    /// JSON manifest describing every job, for the caller to persist or forward.
    pub fn manifest(&self, profile: &str) -> serde_json::Value {
        let jobs: Vec<serde_json::Value> = self
            .outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(asset) => json!({
                    "input": o.job.input.display().to_string(),
                    "output": asset.output.display().to_string(),
                    "width": asset.width,
                    "height": asset.height,
                    "byteSize": asset.byte_size,
                    "dpi": asset.dpi,
                }),
                Err(e) => json!({
                    "input": o.job.input.display().to_string(),
                    "errorKind": e.kind(),
                    "inputError": e.is_input_error(),
                    "error": e.to_string(),
                }),
            })
            .collect();

        json!({
            "profile": profile,
            "succeeded": self.succeeded(),
            "failed": self.failed(),
            "jobs": jobs,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Write the batch manifest to `<output_dir>/manifest.json`.
pub async fn write_manifest(
    config: &CliConfig,
    report: &BatchReport,
) -> Result<PathBuf, anyhow::Error> {
    let path = config.output_dir.join("manifest.json");
    let body = serde_json::to_vec_pretty(&report.manifest(&config.profile.name))?;
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

/// Output path for `input`: `<output_dir>/<stem>.print.png`.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    output_dir.join(format!("{stem}.print.png"))
}

/// Pair every input with its output path. Inputs whose output path is already
/// claimed by an earlier input carry that earlier input, and are not run.
fn plan_jobs(output_dir: &Path, inputs: &[PathBuf]) -> Vec<(PrintJob, Option<PathBuf>)> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            let job = PrintJob {
                input: input.clone(),
                output: output_path(output_dir, input),
            };
            let first = claimed.get(&job.output).map(|p| (*p).clone());
            if first.is_none() {
                claimed.insert(job.output.clone(), input);
            }
            (job, first)
        })
        .collect()
}

/// Whether the file holds base64 / data URL text rather than image bytes.
fn is_text_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("b64") || e.eq_ignore_ascii_case("txt"))
}

/// Normalize one payload. Runs on the blocking pool.
fn normalize_payload(
    payload: Vec<u8>,
    text_input: bool,
    spec: &PrintSpec,
) -> Result<RenderedAsset, JobError> {
    if text_input {
        let text = std::str::from_utf8(&payload).map_err(|_| JobError::NotText)?;
        Ok(print_normalizer::normalize(ImageSource::from_text(text), spec)?)
    } else {
        Ok(print_normalizer::normalize(&payload, spec)?)
    }
}

async fn run_job(
    job: &PrintJob,
    spec: PrintSpec,
    timeout: Duration,
) -> Result<AssetSummary, JobError> {
    let payload = tokio::fs::read(&job.input).await.map_err(JobError::Read)?;
    let text_input = is_text_input(&job.input);

    // The blocking task cannot be interrupted; on timeout its result is dropped.
    let work = tokio::task::spawn_blocking(move || normalize_payload(payload, text_input, &spec));
    let asset = match tokio::time::timeout(timeout, work).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => return Err(JobError::Worker(join_err.to_string())),
        Err(_) => return Err(JobError::TimedOut(timeout)),
    };

    tokio::fs::write(&job.output, asset.bytes())
        .await
        .map_err(JobError::Write)?;

    Ok(AssetSummary {
        output: job.output.clone(),
        width: asset.width(),
        height: asset.height(),
        byte_size: asset.byte_size(),
        dpi: asset.dpi(),
    })
}

/// Run every input in `config` and log one line per job.
pub async fn run_batch(config: &CliConfig) -> Result<BatchReport, anyhow::Error> {
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let spec = config.profile.spec_for(&config.worker_request());
    spec.validate()?;

    tracing::info!(
        profile = %config.profile.name,
        jobs = config.inputs.len(),
        workers = config.workers,
        timeout_secs = config.job_timeout.as_secs(),
        output_dir = %config.output_dir.display(),
        "Starting print batch"
    );

    let permits = Arc::new(Semaphore::new(config.workers.max(1)));
    let mut handles = Vec::with_capacity(config.inputs.len());

    let jobs = plan_jobs(&config.output_dir, &config.inputs);
    for (job, first_input) in &jobs {
        let job = job.clone();
        let first_input = first_input.clone();
        let permits = Arc::clone(&permits);
        let spec = spec.clone();
        let timeout = config.job_timeout;

        handles.push(tokio::spawn(async move {
            let result = if let Some(first_input) = first_input {
                Err(JobError::OutputTaken {
                    output: job.output.clone(),
                    first_input,
                })
            } else {
                match permits.acquire_owned().await {
                    Ok(_permit) => run_job(&job, spec, timeout).await,
                    Err(e) => Err(JobError::Worker(e.to_string())),
                }
            };
            log_outcome(&job, &result);
            JobOutcome { job, result }
        }));
    }

    let mut report = BatchReport::default();
    for (handle, (job, _)) in handles.into_iter().zip(jobs) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let result = Err(JobError::Worker(e.to_string()));
                log_outcome(&job, &result);
                JobOutcome { job, result }
            }
        };
        report.outcomes.push(outcome);
    }

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Print batch finished"
    );
    Ok(report)
}

fn log_outcome(job: &PrintJob, result: &Result<AssetSummary, JobError>) {
    match result {
        Ok(asset) => tracing::info!(
            input = %job.input.display(),
            output = %asset.output.display(),
            width = asset.width,
            height = asset.height,
            byte_size = asset.byte_size,
            dpi = asset.dpi,
            "Print asset written"
        ),
        Err(e) => tracing::error!(
            input = %job.input.display(),
            kind = e.kind(),
            error = %e,
            "Print job failed"
        ),
    }
}
