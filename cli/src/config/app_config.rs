//! Runtime configuration: defaults, then environment, then command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use print_normalizer::{CropArea, PrintProfile, WorkerRequest};

use super::validation::{crop_arg, output_dir_arg, profile_arg, timeout_arg, workers_arg};

pub const DEFAULT_PROFILE: &str = "standard";
pub const DEFAULT_OUTPUT_DIR: &str = "./print-output";
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 30;

/// Normalize captured frames into print-ready PNGs.
#[derive(Parser, Debug)]
#[command(
    name = "screenmerch-print",
    version,
    about,
    after_help = "Inputs ending in .b64 or .txt are read as base64 / data URL text."
)]
pub struct Args {
    /// Print profile (standard, soft-edge, sticker)
    #[arg(
        long,
        env = "SCREENMERCH_PRINT_PROFILE",
        value_name = "NAME",
        default_value = DEFAULT_PROFILE,
        value_parser = profile_arg
    )]
    pub profile: PrintProfile,

    /// Crop rectangle applied to every input
    #[arg(long, env = "SCREENMERCH_CROP", value_name = "X,Y,W,H", value_parser = crop_arg)]
    pub crop: Option<CropArea>,

    /// Output directory
    #[arg(
        long = "out",
        env = "SCREENMERCH_OUTPUT_DIR",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        value_parser = output_dir_arg
    )]
    pub output_dir: PathBuf,

    /// Parallel jobs (1-64) [default: available cores]
    #[arg(long, env = "SCREENMERCH_WORKERS", value_name = "N", value_parser = workers_arg)]
    pub workers: Option<usize>,

    /// Per-job timeout in seconds (1-600)
    #[arg(
        long,
        env = "SCREENMERCH_JOB_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_JOB_TIMEOUT_SECS,
        value_parser = timeout_secs_arg
    )]
    pub timeout: u64,

    /// Image files, or .b64 / .txt files holding base64 or a data URL
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
}

fn timeout_secs_arg(value: &str) -> Result<u64, String> {
    timeout_arg(value).map(|d| d.as_secs())
}

/// Runtime configuration for one batch run.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub profile: PrintProfile,
    pub crop: Option<CropArea>,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub job_timeout: Duration,
    pub inputs: Vec<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            profile: PrintProfile::standard(),
            crop: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: default_workers(),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            inputs: Vec::new(),
        }
    }
}

impl From<Args> for CliConfig {
    fn from(args: Args) -> Self {
        Self {
            profile: args.profile,
            crop: args.crop,
            output_dir: args.output_dir,
            workers: args.workers.unwrap_or_else(default_workers),
            job_timeout: Duration::from_secs(args.timeout),
            inputs: args.inputs,
        }
    }
}

impl CliConfig {
    /// The request every job in this batch is processed with.
    pub fn worker_request(&self) -> WorkerRequest {
        WorkerRequest {
            crop_area: self.crop,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(64))
        .unwrap_or(1)
}
