//! Top-level subcommands.

use chartsrv_core::ChartKind;
use clap::Subcommand;

use crate::config_commands::ConfigCommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chart server and keep it supervised until Ctrl-C
    Run {
        /// Config file name inside the config directory (defaults when omitted)
        #[arg(short, long)]
        config: Option<String>,
        /// Open the chart page in the default browser once running
        #[arg(long)]
        open: bool,
    },
    /// Shut down orphaned chart servers left on the configured port range
    Reap {
        /// Config file name whose port range should be swept
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Inspect and persist server configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Start a server, replace its chart data, print the result and stop
    Push {
        /// Comma-separated values
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
        /// Comma-separated labels, one per value
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Start a server, switch its chart kind, print the result and stop
    Switch {
        /// line, bar or pie (anything else means line)
        kind: ChartKind,
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Start a server, ask it for random data, print the result and stop
    Random {
        #[arg(short, long)]
        config: Option<String>,
    },
}
