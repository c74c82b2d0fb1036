// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use pypi_client::Config;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Session;

/// Load the configuration file and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().or_else(Config::default_path);
    let mut config = match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.endpoint = url.clone();
    }
    if let Some(snapshot) = &cli.snapshot {
        config.snapshot = Some(snapshot.clone());
    }
    debug!("Using endpoint {}", config.endpoint);
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&cli)?;
    let mut session = Session::open(&config)?;

    match cli.command {
        Commands::List { force } => commands::cmd_list(&mut session, force),
        Commands::Refresh { categories } => commands::cmd_refresh(&mut session, categories),
        Commands::Releases { name, show_hidden } => {
            commands::cmd_releases(&mut session, &name, show_hidden)
        }
        Commands::Roles { name } => commands::cmd_roles(&mut session, &name),
        Commands::Downloads { name, version } => {
            commands::cmd_downloads(&mut session, &name, &version)
        }
        Commands::Urls { name, version } => commands::cmd_urls(&mut session, &name, &version),
        Commands::ReleaseData { name, version } => {
            commands::cmd_release_data(&mut session, &name, &version)
        }
        Commands::Show { name, version } => {
            commands::cmd_show(&mut session, &name, version.as_deref())
        }
    }
}
