//! CLI bootstrap - the composition root.
//!
//! This is the only place where concrete adapters are chosen: the
//! filesystem executable locator, the reqwest transport and the system
//! browser. Handlers receive a [`CliContext`] and never build their own.

use std::sync::Arc;

use anyhow::Result;
use chartsrv_core::{ServerConfig, load_config};
use chartsrv_runtime::{ChartSupervisor, FsExecutableLocator, SystemBrowser};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Fully composed context for CLI commands.
pub struct CliContext {
    supervisor: Arc<ChartSupervisor>,
    config: ServerConfig,
}

impl CliContext {
    pub const fn supervisor(&self) -> &Arc<ChartSupervisor> {
        &self.supervisor
    }

    /// The config the command should start the server with.
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Build the context, loading `config_file` from the config directory
/// when given and falling back to the defaults otherwise.
pub fn bootstrap(config_file: Option<&str>) -> Result<CliContext> {
    let config = match config_file {
        Some(name) => load_config(name).map_err(CliError::from)?,
        None => ChartSupervisor::default_config(),
    };

    let supervisor = ChartSupervisor::new(Arc::new(FsExecutableLocator::default_search()))
        .with_browser(Arc::new(SystemBrowser))
        .with_config(config.clone());

    Ok(CliContext {
        supervisor: Arc::new(supervisor),
        config,
    })
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
