//! `backsweep` command-line surface.
//!
//! Load a TOML experiment config, resolve the strategy via the registry,
//! run it, print a ranked console table, and write the JSON report. Kept
//! deliberately thin: a wrapper over `backsweep-config`/`backsweep-engine`,
//! not a place for business logic.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use backsweep_config::ConfigError;
use backsweep_engine::EngineError;
use chrono::Utc;
use clap::{Parser, Subcommand};
use report::Reporter;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backsweep")]
#[command(about = "Parameter-sweep backtesting engine for tick-level trading strategies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an experiment described by a TOML config file.
    Run {
        /// Path to the experiment's TOML configuration file.
        config: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Report(#[from] report::ReportError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { config } => match run(&config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(config_path: &PathBuf) -> Result<(), CliError> {
    backsweep_strategies::register_all();

    tracing::info!(path = %config_path.display(), "loading configuration");
    let config = backsweep_config::ExperimentConfig::from_toml(config_path)?;

    tracing::info!(experiment = %config.experiment_name, strategy = %config.strategy, "starting experiment");
    let results = backsweep_engine::run_experiment(&config)?;

    let reporter = Reporter::new(config.experiment_name.clone());
    reporter.print_console(&results);
    let path = reporter.save_json(&results, &Utc::now().to_rfc3339())?;
    tracing::info!(path = %path.display(), "saved results");

    Ok(())
}
