//! Persisted `ServerConfig` files.
//!
//! Files live in `<data_root>/ChartServer/`. A failed load never produces a
//! partially applied config: callers get an error and keep what they had.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::error::{ConfigFileError, PathError};
use super::platform::data_root;
use crate::config::{ServerConfig, validate_config};

/// Subdirectory of the data root holding persisted configs.
pub const CONFIG_SUBDIR: &str = "ChartServer";

/// Directory holding persisted config files.
pub fn config_dir() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(CONFIG_SUBDIR))
}

/// Full path of a config file inside [`config_dir`].
///
/// Only plain file names are accepted; separators and `..` are rejected.
pub fn config_file_path(file_name: &str) -> Result<PathBuf, PathError> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(config_dir()?.join(file_name)),
        _ => Err(PathError::InvalidFileName(file_name.to_string())),
    }
}

/// Write `config` as pretty JSON to `path`, creating parent directories.
pub fn write_config_file(path: &Path, config: &ServerConfig) -> Result<(), ConfigFileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PathError::CreateFailed {
            path: parent.to_path_buf(),
            reason: e.to_string(),
        })?;
    }

    let json = serde_json::to_string_pretty(config).map_err(|e| ConfigFileError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    fs::write(path, json).map_err(|e| ConfigFileError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Read and validate a config from `path`.
pub fn read_config_file(path: &Path) -> Result<ServerConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config: ServerConfig =
        serde_json::from_str(&raw).map_err(|e| ConfigFileError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    validate_config(&config).map_err(|source| ConfigFileError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(config)
}

/// Save `config` under `file_name` in the config directory.
///
/// Returns the path written.
pub fn save_config(config: &ServerConfig, file_name: &str) -> Result<PathBuf, ConfigFileError> {
    let path = config_file_path(file_name)?;
    write_config_file(&path, config)?;
    tracing::info!(path = %path.display(), "Saved chart server config");
    Ok(path)
}

/// Load the config saved under `file_name` in the config directory.
pub fn load_config(file_name: &str) -> Result<ServerConfig, ConfigFileError> {
    let path = config_file_path(file_name)?;
    let config = read_config_file(&path)?;
    tracing::info!(path = %path.display(), "Loaded chart server config");
    Ok(config)
}
