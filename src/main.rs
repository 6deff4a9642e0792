//! Stager - deploy swagger-defined APIs to API Gateway stages
//!
//! CLI entry point that dispatches to subcommands.

use clap::{CommandFactory, Parser};
use console::style;
use stager::cli::{Cli, Commands};
use stager::config::{Config, ConfigManager};
use stager::error::{StagerError, StagerResult};
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

fn init_logging(verbose: u8, config: &Config) {
    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("stager=warn"),
        1 => EnvFilter::new("stager=info"),
        _ => EnvFilter::new("stager=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> StagerResult<()> {
    let cli = Cli::parse();

    // Completions don't need config loading
    if let Commands::Completions { shell } = cli.command {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "stager", &mut std::io::stdout());
        return Ok(());
    }

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| StagerError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Merged local config: {}", path.display());
    }

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Setup(args) => stager::cli::commands::setup(args, &config).await,
        Commands::Shutdown(args) => stager::cli::commands::shutdown(args, &config).await,
        Commands::Endpoint(args) => stager::cli::commands::endpoint(args, &config).await,
        Commands::Artifact(args) => stager::cli::commands::artifact(args, &config).await,
        Commands::Config(args) => {
            stager::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
