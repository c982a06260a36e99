use std::fmt;
use std::path::PathBuf;

use chartsrv_core::{ConfigError, LocateError};

/// Fatal-to-operation failures of `start`/`restart`.
///
/// Every variant leaves the supervisor in `ServerStatus::Error`.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error(transparent)]
    ExecutableNotFound(#[from] LocateError),

    #[error("Failed to spawn chart server {path}: {reason}")]
    SpawnFailed { path: PathBuf, reason: String },

    #[error("Chart server at {url} did not become healthy after {attempts} attempts")]
    HealthCheckFailed { url: String, attempts: u32 },

    #[error("Invalid chart server config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// How `stop` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// There was no process to stop.
    NotRunning,
    /// The process exited on its own after the shutdown request.
    Graceful,
    /// The process had to be killed.
    Forced,
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning => write!(f, "not running"),
            Self::Graceful => write!(f, "stopped gracefully"),
            Self::Forced => write!(f, "force-terminated"),
        }
    }
}
