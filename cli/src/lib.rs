//! Operator-facing print maintenance command for ScreenMerch.
//!
//! Wraps the print normalizer with environment configuration, a bounded
//! blocking worker pool and per-job timeouts.

use std::path::{Path, PathBuf};

pub mod config;
pub mod services;

/// Where `.env` is looked for, relative to the working directory.
const DOTENV_CANDIDATES: [&str; 3] = [".env", "../.env", "../../.env"];

/// Load the first `.env` found from the working directory upwards and
/// return its path.
///
/// Runs before the tracing subscriber exists, so a `RUST_LOG` in the file
/// takes effect; the caller logs the result.
pub fn load_dotenv() -> Option<PathBuf> {
    load_dotenv_from(&std::env::current_dir().unwrap_or_default())
}

fn load_dotenv_from(base: &Path) -> Option<PathBuf> {
    DOTENV_CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|path| dotenvy::from_path(path).is_ok())
}
