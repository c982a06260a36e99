//! Path utilities for chartsrv data and resource locations.
//!
//! - Data root (persisted configuration)
//! - Resource root (where the chart server binary ships)
//! - Config file persistence under the fixed `ChartServer/` subdirectory
//!
//! OS-specific logic is kept private in `platform`.

mod config;
mod error;
mod platform;
mod server;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{
    CONFIG_SUBDIR, config_dir, config_file_path, load_config, read_config_file, save_config,
    write_config_file,
};
pub use error::{ConfigFileError, PathError};
pub use platform::{data_root, resource_root};
pub use server::{SERVER_BINARY_NAME, server_search_paths};
