//! Setting value validation.
//!
//! The `*_arg` functions are clap value parsers. Flags and their
//! `SCREENMERCH_*` variables share them, so both are checked the same way.

use std::path::PathBuf;
use std::time::Duration;

use print_normalizer::{CropArea, PrintProfile};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SCREENMERCH_PRINT_PROFILE" => {
            if PrintProfile::by_name(value).is_none() {
                return Err(format!(
                    "unknown profile '{value}' (expected one of: {})",
                    print_normalizer::profile::BUILTIN_PROFILES.join(", ")
                ));
            }
        }
        "SCREENMERCH_OUTPUT_DIR" => {
            if value.trim().is_empty() {
                return Err("output directory must not be empty".into());
            }
        }
        "SCREENMERCH_WORKERS" => validate_int_range(value, 1, 64)?,
        "SCREENMERCH_JOB_TIMEOUT_SECS" => validate_int_range(value, 1, 600)?,
        "SCREENMERCH_CROP" => {
            parse_crop(value)?;
        }
        _ => {}
    }
    Ok(())
}

/// Parse `X,Y,W,H` into a crop tuple. Range checks happen in the normalizer.
pub fn parse_crop(value: &str) -> Result<(i64, i64, i64, i64), String> {
    let parts: Vec<i64> = value
        .split(',')
        .map(|p| p.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| "crop must be four integers: X,Y,W,H")?;

    match parts.as_slice() {
        &[x, y, w, h] => Ok((x, y, w, h)),
        _ => Err("crop must be four integers: X,Y,W,H".into()),
    }
}

pub fn profile_arg(value: &str) -> Result<PrintProfile, String> {
    validate_setting("SCREENMERCH_PRINT_PROFILE", value)?;
    PrintProfile::by_name(value).ok_or_else(|| format!("unknown profile '{value}'"))
}

pub fn output_dir_arg(value: &str) -> Result<PathBuf, String> {
    validate_setting("SCREENMERCH_OUTPUT_DIR", value)?;
    Ok(PathBuf::from(value.trim()))
}

pub fn workers_arg(value: &str) -> Result<usize, String> {
    validate_setting("SCREENMERCH_WORKERS", value)?;
    value.parse().map_err(|_| "must be an integer".into())
}

pub fn timeout_arg(value: &str) -> Result<Duration, String> {
    validate_setting("SCREENMERCH_JOB_TIMEOUT_SECS", value)?;
    let secs: u64 = value.parse().map_err(|_| "must be an integer")?;
    Ok(Duration::from_secs(secs))
}

pub fn crop_arg(value: &str) -> Result<CropArea, String> {
    let (x, y, width, height) = parse_crop(value)?;
    Ok(CropArea::new(x, y, width, height))
}

fn validate_int_range(value: &str, min: i32, max: i32) -> Result<(), String> {
    let v: i32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
