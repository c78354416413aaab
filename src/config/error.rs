//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// Raised synchronously at load or construction time; fatal to router
/// startup, never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("No providers configured")]
    NoProviders,

    #[error("No handle supplied for configured provider '{0}'")]
    MissingHandle(String),
}
