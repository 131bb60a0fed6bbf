//! actfetch - fetch and cache workflow actions
//!
//! CLI entry point that dispatches to subcommands.

use actfetch::cli::{Cli, Commands};
use actfetch::config::{Config, ConfigManager};
use actfetch::error::ActfetchResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ActfetchResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    let cache_root = ConfigManager::cache_root(&config, cli.cache_dir.as_deref());
    debug!("Using cache root {}", cache_root.display());

    match cli.command {
        Commands::Fetch(args) => actfetch::cli::commands::fetch(args, &config, &cache_root).await,
        Commands::Resolve(args) => actfetch::cli::commands::resolve(args, &config).await,
        Commands::Cache(args) => actfetch::cli::commands::cache(args, &config, &cache_root).await,
        Commands::Config(args) => {
            actfetch::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logs go to stderr: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("actfetch=warn"),
        1 => EnvFilter::new("actfetch=info"),
        _ => EnvFilter::new("actfetch=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
