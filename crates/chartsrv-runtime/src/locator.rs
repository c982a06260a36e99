//! Filesystem-backed chart server executable locator.
//!
//! Resolution order:
//! 1. `CHARTSRV_SERVER_PATH` environment variable (explicit override)
//! 2. `<resource_root>/Plugins/ChartServer/Binaries/<platform>/chart_server`
//! 3. `<resource_root>/ChartServer/chart_server`
//!
//! A candidate must be a regular file and, on Unix, have an execute bit set.

use std::env;
use std::path::{Path, PathBuf};

use chartsrv_core::{ExecutableLocator, LocateError, server_search_paths};
use tracing::debug;

/// Environment variable naming the chart server executable explicitly.
pub const SERVER_PATH_ENV: &str = "CHARTSRV_SERVER_PATH";

#[derive(Debug, Clone)]
enum Candidates {
    /// Env override, then the standard search paths.
    Default,
    /// Exactly these paths, in order.
    Fixed(Vec<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct FsExecutableLocator {
    candidates: Candidates,
}

impl FsExecutableLocator {
    /// Standard search: env override first, then the plugin and project paths.
    pub const fn default_search() -> Self {
        Self {
            candidates: Candidates::Default,
        }
    }

    /// Search only `paths`, in order.
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            candidates: Candidates::Fixed(paths),
        }
    }

    /// Use exactly one path.
    pub fn fixed(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![path.into()])
    }

    fn candidate_paths(&self) -> Result<Vec<PathBuf>, LocateError> {
        match &self.candidates {
            Candidates::Fixed(paths) => Ok(paths.clone()),
            Candidates::Default => {
                if let Some(path) = env::var_os(SERVER_PATH_ENV).filter(|p| !p.is_empty()) {
                    return Ok(vec![PathBuf::from(path)]);
                }
                server_search_paths().map_err(|e| LocateError::PathResolution(e.to_string()))
            }
        }
    }
}

impl Default for FsExecutableLocator {
    fn default() -> Self {
        Self::default_search()
    }
}

impl ExecutableLocator for FsExecutableLocator {
    fn locate(&self) -> Result<PathBuf, LocateError> {
        let searched = self.candidate_paths()?;

        for path in &searched {
            if is_executable_file(path) {
                debug!(path = %path.display(), "Found chart server executable");
                return Ok(path.clone());
            }
            debug!(path = %path.display(), "No usable chart server executable here");
        }

        Err(LocateError::NotFound { searched })
    }
}

fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
