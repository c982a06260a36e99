//! CLI-specific error types and exit code mappings.

use chartsrv_core::{ConfigError, ConfigFileError, PathError};
use chartsrv_runtime::SupervisorError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// An operation the user asked for did not succeed.
    #[error("{0}")]
    Operation(String),

    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The chart server process could not be started.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Operation(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Process(_) => 71,  // EX_OSERR
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::InvalidConfig(_) => Self::Config(err.to_string()),
            SupervisorError::ExecutableNotFound(_)
            | SupervisorError::SpawnFailed { .. }
            | SupervisorError::HealthCheckFailed { .. } => Self::Process(err.to_string()),
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(err: ConfigFileError) -> Self {
        match err {
            ConfigFileError::Io { .. } => Self::Io(err.to_string()),
            ConfigFileError::Path(PathError::InvalidFileName(_)) => Self::Arguments(err.to_string()),
            _ => Self::Config(err.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartsrv_core::LocateError;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Operation("x".into()).exit_code(), 1);
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Io("x".into()).exit_code(), 74);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(CliError::Process("x".into()).exit_code(), 71);
    }

    #[test]
    fn test_supervisor_errors_map_by_class() {
        let missing = SupervisorError::from(LocateError::NotFound { searched: vec![] });
        assert_eq!(CliError::from(missing).exit_code(), 71);

        let invalid = SupervisorError::from(ConfigError::EmptyHost);
        assert_eq!(CliError::from(invalid).exit_code(), 78);
    }

    #[test]
    fn test_config_file_errors_map_by_class() {
        let missing = ConfigFileError::NotFound(PathBuf::from("/nope.json"));
        assert_eq!(CliError::from(missing).exit_code(), 78);

        let bad_name = ConfigFileError::Path(PathError::InvalidFileName("../x".into()));
        assert_eq!(CliError::from(bad_name).exit_code(), 2);
    }
}
