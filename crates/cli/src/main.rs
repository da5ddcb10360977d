use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use surebet_core::{AppConfig, ConfigLoader};

mod commands;

use commands::{CalcArgs, ConvertArgs, RatesArgs};

#[derive(Parser)]
#[command(name = "surebet")]
#[command(version)]
#[command(about = "Multi-currency surebet stake calculator", long_about = None)]
struct Cli {
    /// Config file path (defaults to config/Config.toml when present)
    #[arg(short, long, global = true, env = "SUREBET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Equalize an operation and analyze every outcome
    Calc(CalcArgs),
    /// Convert an amount between two currencies through BRL
    Convert(ConvertArgs),
    /// Show the resolved BRL rate table
    Rates(RatesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Reports go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Calc(args) => commands::run_calc(&config, &args)?,
        Commands::Convert(args) => commands::run_convert(&config, &args)?,
        Commands::Rates(args) => commands::run_rates(&config, &args)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            ConfigLoader::load_from(path)?
        }
        None => ConfigLoader::load()?,
    };
    tracing::debug!(
        consolidation = %config.engine.consolidation_currency,
        expected_legs = config.engine.expected_legs,
        rounding = %config.engine.rounding,
        "Config loaded"
    );
    Ok(config)
}
