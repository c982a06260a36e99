//! Platform-specific root resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub(crate) const DATA_DIR_ENV: &str = "CHARTSRV_DATA_DIR";

/// Environment variable overriding the resource root.
pub(crate) const RESOURCE_DIR_ENV: &str = "CHARTSRV_RESOURCE_DIR";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `CHARTSRV_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/chartsrv`), created if missing
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    let root = data_dir.join("chartsrv");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Get the root directory for shipped resources (the chart server binary).
///
/// Resolution order:
/// 1. `CHARTSRV_RESOURCE_DIR` environment variable
/// 2. Directory containing the running executable
pub fn resource_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(RESOURCE_DIR_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let exe = env::current_exe().map_err(|e| PathError::CurrentExeError(e.to_string()))?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or_else(|| PathError::CurrentExeError(format!("{} has no parent", exe.display())))
}
