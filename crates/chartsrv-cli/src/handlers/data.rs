//! `chartsrv push | switch | random`: one-shot data operations.
//!
//! Each command starts a server, performs a single operation, prints the
//! cached result and stops the server again.

use anyhow::Result;
use chartsrv_core::{ChartData, ChartKind};
use chartsrv_runtime::ChartSupervisor;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// A single data operation against a running server.
#[derive(Debug, Clone, PartialEq)]
pub enum DataCommand {
    Push(ChartData),
    Switch(ChartKind),
    Random,
}

impl DataCommand {
    /// Build a push, rejecting mismatched label counts before any server starts.
    pub fn push(values: Vec<f64>, labels: Vec<String>) -> Result<Self, CliError> {
        if values.is_empty() {
            return Err(CliError::Arguments("at least one value is required".into()));
        }
        if !labels.is_empty() && labels.len() != values.len() {
            return Err(CliError::Arguments(format!(
                "{} labels given for {} values",
                labels.len(),
                values.len()
            )));
        }
        Ok(Self::Push(ChartData::new(values, labels)))
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Push(_) => "update",
            Self::Switch(_) => "switch",
            Self::Random => "random",
        }
    }

    async fn apply(self, supervisor: &ChartSupervisor) -> bool {
        match self {
            Self::Push(data) => supervisor.update_data(data).await,
            Self::Switch(kind) => supervisor.switch_chart_kind(kind).await,
            Self::Random => supervisor.generate_random_data().await,
        }
    }
}

pub async fn execute(ctx: &CliContext, command: DataCommand) -> Result<()> {
    let supervisor = ctx.supervisor();
    let endpoint = supervisor
        .start(ctx.config().clone())
        .await
        .map_err(CliError::from)?;
    println!("Chart server running at {endpoint}");

    let name = command.name();
    let accepted = command.apply(supervisor).await;

    if accepted {
        println!("Chart kind: {}", supervisor.cached_chart_kind().await);
        print_data(&supervisor.cached_data().await);
    }

    let outcome = supervisor.stop().await;
    println!("Chart server stopped ({outcome})");

    if accepted {
        Ok(())
    } else {
        Err(CliError::Operation(format!("the chart server rejected the {name} request")).into())
    }
}

fn print_data(data: &ChartData) {
    if data.is_empty() {
        println!("Chart data: (none cached)");
        return;
    }
    println!("Chart data ({} points):", data.len());
    for (i, value) in data.values.iter().enumerate() {
        match data.labels.get(i) {
            Some(label) => println!("  {label:>12}  {value}"),
            None => println!("  {:>12}  {value}", i + 1),
        }
    }
}
