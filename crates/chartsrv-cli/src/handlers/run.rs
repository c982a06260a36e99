//! `chartsrv run`: start the server and supervise it until Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use chartsrv_runtime::HealthMonitor;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, open: bool) -> Result<()> {
    let supervisor = Arc::clone(ctx.supervisor());
    let endpoint = supervisor
        .start(ctx.config().clone())
        .await
        .map_err(CliError::from)?;

    println!("Chart server running at {endpoint}");
    if open && !supervisor.open_in_browser().await {
        warn!(url = %endpoint.url, "Could not open the chart page in a browser");
    }

    let cancel = CancellationToken::new();
    let monitor = HealthMonitor::from_config(Arc::clone(&supervisor), cancel.clone()).await;
    let watcher = tokio::spawn(async move {
        let updates = monitor.monitor();
        futures_util::pin_mut!(updates);
        while let Some(status) = updates.next().await {
            println!("Chart server status: {status}");
        }
    });

    println!("Press Ctrl-C to stop");
    let signal = tokio::signal::ctrl_c().await;

    cancel.cancel();
    if let Err(e) = watcher.await {
        warn!(error = %e, "Health monitor task failed");
    }

    info!("Stopping chart server");
    let outcome = supervisor.stop().await;
    println!("Chart server stopped ({outcome})");

    signal.map_err(|e| CliError::Io(e.to_string()).into())
}
