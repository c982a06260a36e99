//! Resolution of the chart server executable.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from locating the chart server binary.
#[derive(Debug, Clone, Error)]
pub enum LocateError {
    /// No candidate path held a usable executable.
    #[error("Chart server executable not found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// The search paths themselves could not be computed.
    #[error("Cannot resolve chart server search paths: {0}")]
    PathResolution(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Finds the chart server executable on disk.
///
/// A missing executable is fatal for `Start` and is never retried.
pub trait ExecutableLocator: Send + Sync {
    fn locate(&self) -> Result<PathBuf, LocateError>;
}
