//! Configuration management: defaults, validation, loading from environment + flags.

pub mod app_config;
pub mod validation;

pub use app_config::{Args, CliConfig};
