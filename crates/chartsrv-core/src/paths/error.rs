//! Path and config-file error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Could not determine where the running executable lives.
    #[error("Cannot determine executable location: {0}")]
    CurrentExeError(String),

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// A file name escaped the config directory or was empty.
    #[error("Invalid config file name: {0:?}")]
    InvalidFileName(String),
}

/// Errors from reading or writing a persisted config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Config file {0} does not exist")]
    NotFound(PathBuf),

    #[error("Failed to access config file {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Malformed config file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Config file {path} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}
