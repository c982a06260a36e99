//! Development chart server.
//!
//! Binds the first free port in `[--port, --max-port]` and serves the chart
//! server protocol from memory until `POST /api/shutdown`, Ctrl-C or SIGTERM.

use anyhow::{Context, Result, bail};
use chartsrv_cli::stub;
use chartsrv_runtime::find_available_port;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "chart-server-stub")]
#[command(about = "In-memory chart server for development and tests")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Preferred port
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Last port to try when the preferred one is busy (defaults to --port)
    #[arg(long)]
    max_port: Option<u16>,

    /// Accepted for compatibility; the stub never writes an info file
    #[arg(long)]
    no_info_file: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let max_port = args.max_port.unwrap_or(args.port);
    let Some(port) = find_available_port(args.port, max_port) else {
        bail!("no free port in {}-{}", args.port, max_port);
    };
    let listener = TcpListener::bind((args.host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {}:{port}", args.host))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    info!(host = %args.host, port = %port, "Starting chart server stub");
    if !args.no_info_file {
        debug!("Info file requested but not supported; ignoring");
    }
    stub::serve(listener, args.host, shutdown).await?;
    Ok(())
}

async fn shutdown_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut term) = signal(SignalKind::terminate()) {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
            shutdown.cancel();
            return;
        }
    }
    if tokio::signal::ctrl_c().await.is_ok() {
        shutdown.cancel();
    }
}
