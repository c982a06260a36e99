//! Command-line front end for the chart server supervisor.
//!
//! The `chartsrv` binary wires the runtime together in [`bootstrap`] and
//! dispatches to [`handlers`]. The `chart-server-stub` binary serves the
//! chart server HTTP protocol from [`stub`] for development and tests.

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod stub;

pub use bootstrap::{CliContext, bootstrap, init_tracing};
pub use commands::Commands;
pub use config_commands::ConfigCommand;
pub use error::CliError;
pub use parser::Cli;
