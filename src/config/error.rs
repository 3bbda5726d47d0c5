//! Typed configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating `gully.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },

    #[error("invalid source glob '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}
