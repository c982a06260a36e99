//! Search order for the chart server executable.

use std::path::PathBuf;

use super::error::PathError;
use super::platform::resource_root;

/// File name of the chart server binary on this platform.
#[cfg(windows)]
pub const SERVER_BINARY_NAME: &str = "chart_server.exe";

/// File name of the chart server binary on this platform.
#[cfg(not(windows))]
pub const SERVER_BINARY_NAME: &str = "chart_server";

#[cfg(target_os = "windows")]
const PLATFORM_DIR: &str = "Win64";
#[cfg(target_os = "macos")]
const PLATFORM_DIR: &str = "Mac";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_DIR: &str = "Linux";

/// Candidate locations for the chart server binary, in search order.
///
/// 1. `<resource_root>/Plugins/ChartServer/Binaries/<platform>/chart_server`
/// 2. `<resource_root>/ChartServer/chart_server`
pub fn server_search_paths() -> Result<Vec<PathBuf>, PathError> {
    let root = resource_root()?;
    Ok(vec![
        root.join("Plugins")
            .join("ChartServer")
            .join("Binaries")
            .join(PLATFORM_DIR)
            .join(SERVER_BINARY_NAME),
        root.join("ChartServer").join(SERVER_BINARY_NAME),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::platform::RESOURCE_DIR_ENV;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn test_plugin_dir_comes_first() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(RESOURCE_DIR_ENV, "/srv/app");

        let paths = server_search_paths().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].starts_with("/srv/app/Plugins/ChartServer/Binaries"));
        assert_eq!(
            paths[1],
            PathBuf::from("/srv/app/ChartServer").join(SERVER_BINARY_NAME)
        );
    }
}
