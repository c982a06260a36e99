//! `chartsrv reap`: shut down orphaned chart servers.

use anyhow::Result;

use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let range = ctx.config().port_range();
    println!(
        "Sweeping ports {}-{} for orphaned chart servers...",
        range.start(),
        range.end()
    );

    let report = ctx.supervisor().reap_zombies().await;

    if report.reclaimed_handle {
        println!("Reclaimed a dead server handle");
    }
    println!("Occupied ports probed: {}", format_ports(&report.probed));
    println!("Shutdown requested:    {}", format_ports(&report.shutdown_sent));
    Ok(())
}

fn format_ports(ports: &[u16]) -> String {
    if ports.is_empty() {
        return "none".to_string();
    }
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
