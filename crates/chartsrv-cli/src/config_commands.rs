//! Configuration management subcommands.

use clap::Subcommand;

/// Configuration management commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the config directory and the config a command would use
    Show {
        /// Config file name to show instead of the defaults
        file: Option<String>,
    },
    /// Print the built-in default configuration
    Default,
    /// Write a config file, starting from the defaults
    Save {
        /// File name inside the config directory
        file: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        preferred_port: Option<u16>,
        #[arg(long)]
        max_port: Option<u16>,
        /// Seconds between background health checks
        #[arg(long)]
        check_interval: Option<f64>,
        /// Scan only the preferred range, never the fixed proxy port
        #[arg(long)]
        no_fixed_proxy: bool,
    },
    /// Load and validate a config file
    Load {
        /// File name inside the config directory
        file: String,
    },
}
