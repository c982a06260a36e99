//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Supervise a local chart server process.
#[derive(Parser)]
#[command(name = "chartsrv")]
#[command(about = "Start, monitor and drive a local chart server")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
