//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging, builds the [`CliContext`] and
//! dispatches to the handlers. Errors that carry a [`CliError`] choose the
//! process exit code.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use chartsrv_cli::handlers::data::DataCommand;
use chartsrv_cli::{Cli, CliError, Commands, bootstrap, handlers, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Run { config, open } => {
            let ctx = bootstrap(config.as_deref())?;
            handlers::run::execute(&ctx, open).await?;
        }
        Commands::Reap { config } => {
            let ctx = bootstrap(config.as_deref())?;
            handlers::reap::execute(&ctx).await?;
        }
        Commands::Config { command } => {
            handlers::config::execute(command)?;
        }
        Commands::Push {
            values,
            labels,
            config,
        } => {
            let command = DataCommand::push(values, labels)?;
            let ctx = bootstrap(config.as_deref())?;
            handlers::data::execute(&ctx, command).await?;
        }
        Commands::Switch { kind, config } => {
            let ctx = bootstrap(config.as_deref())?;
            handlers::data::execute(&ctx, DataCommand::Switch(kind)).await?;
        }
        Commands::Random { config } => {
            let ctx = bootstrap(config.as_deref())?;
            handlers::data::execute(&ctx, DataCommand::Random).await?;
        }
    }

    Ok(())
}
