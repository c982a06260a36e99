//! Config command handler.
//!
//! Config files live in the `ChartServer/` directory under the data root
//! and are addressed by bare file name.

use anyhow::Result;
use chartsrv_core::{ServerConfig, config_dir, load_config, save_config, validate_config};

use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
pub fn execute(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show { file } => handle_show(file.as_deref()),
        ConfigCommand::Default => print_config(&ServerConfig::default()),
        ConfigCommand::Save {
            file,
            host,
            preferred_port,
            max_port,
            check_interval,
            no_fixed_proxy,
        } => {
            let overrides = Overrides {
                host,
                preferred_port,
                max_port,
                check_interval,
                no_fixed_proxy,
            };
            handle_save(&file, &overrides)
        }
        ConfigCommand::Load { file } => {
            let config = load_config(&file).map_err(CliError::from)?;
            println!("Loaded {file}: configuration is valid");
            print_config(&config)
        }
    }
}

/// Field overrides applied on top of the defaults by `config save`.
#[derive(Debug, Default)]
struct Overrides {
    host: Option<String>,
    preferred_port: Option<u16>,
    max_port: Option<u16>,
    check_interval: Option<f64>,
    no_fixed_proxy: bool,
}

impl Overrides {
    fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.preferred_port {
            config.preferred_port = port;
            // Keep the fixed port inside the range the user asked for.
            config.fixed_proxy_port = port;
        }
        if let Some(port) = self.max_port {
            config.max_port = port;
        }
        if let Some(seconds) = self.check_interval {
            config.check_interval_seconds = seconds;
        }
        if self.no_fixed_proxy {
            config.use_fixed_proxy = false;
        }
        config
    }
}

fn handle_show(file: Option<&str>) -> Result<()> {
    let dir = config_dir().map_err(|e| CliError::Config(e.to_string()))?;
    println!("Config directory: {}", dir.display());

    let config = match file {
        Some(name) => load_config(name).map_err(CliError::from)?,
        None => ServerConfig::default(),
    };
    print_config(&config)
}

fn handle_save(file: &str, overrides: &Overrides) -> Result<()> {
    let config = overrides.apply(ServerConfig::default());
    validate_config(&config).map_err(CliError::from)?;

    let path = save_config(&config, file).map_err(CliError::from)?;
    println!("Saved configuration to {}", path.display());
    print_config(&config)
}

fn print_config(config: &ServerConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
