//! taco-build - Cordova toolkit cache and build driver
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use taco_build::cli::{Cli, Commands};
use taco_build::config::{BuildConfig, ConfigManager};
use taco_build::error::TacoResult;
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

async fn run() -> TacoResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("taco_build=warn"),
        1 => EnvFilter::new("taco_build=info"),
        _ => EnvFilter::new("taco_build=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Config file: {}", config_manager.path().display());

    let file_overrides = config_manager.load().await?;
    let defaults = BuildConfig::from_env()?.merged(&file_overrides)?;

    match cli.command {
        Commands::Prepare(args) => taco_build::cli::commands::prepare(args, defaults).await,
        Commands::Build(args) => taco_build::cli::commands::build(args, defaults).await,
        Commands::Package(args) => taco_build::cli::commands::package(args, defaults).await,
        Commands::Cache(args) => taco_build::cli::commands::cache(args, defaults).await,
    }
}
