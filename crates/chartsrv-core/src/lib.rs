//! Core domain types and port definitions for chartsrv.
//!
//! This crate holds everything the chart-server supervisor reasons about
//! without touching processes, sockets or HTTP: status and chart types,
//! the JSON envelope exchanged with the chart server, configuration and its
//! on-disk persistence, and the traits for the external collaborators.

pub mod config;
pub mod contracts;
pub mod domain;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{
    ConfigError, DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_FIXED_PROXY_PORT, DEFAULT_HOST,
    DEFAULT_MAX_PORT, DEFAULT_PREFERRED_PORT, ServerConfig, validate_config,
};
pub use contracts::{
    CONFIG_PATH, ConfigBody, ConfigEnvelope, DataEnvelope, RANDOM_PATH, SHUTDOWN_PATH,
    STATUS_PATH, SWITCH_PATH, StatusEnvelope, SwitchRequest, UPDATE_PATH, UpdateRequest,
    is_success, parse_config_data, parse_random_data,
};
pub use domain::{ChartData, ChartKind, ServerEndpoint, ServerStatus};
pub use paths::{
    ConfigFileError, PathError, config_dir, config_file_path, data_root, load_config,
    read_config_file, resource_root, save_config, server_search_paths, write_config_file,
};
pub use ports::{BrowserError, BrowserLauncher, ExecutableLocator, LocateError, NoopBrowser};
