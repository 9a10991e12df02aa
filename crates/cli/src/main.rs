//! podship: subscription print-on-demand fulfillment.
//!
//! Usage:
//!   podship --config podship.toml ship --invoice inv.json --plans plans.json --trigger payment-received
//!   podship --config podship.toml sweep
//!   podship validate --request form.json --plans plans.json
//!   podship plan --schedule "A,B:C,D" --payments 2 --shipped A

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

use podship_engine::EngineConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    podship_observability::init_with(&config.log_config());
    tracing::debug!(
        data_dir = %cli.data_dir.display(),
        configured = config.is_configured(),
        "podship starting"
    );

    match cli.command {
        Commands::Ship(args) => commands::ship::run(config, &cli.data_dir, args)?,
        Commands::Sweep => commands::sweep::run(config, &cli.data_dir)?,
        Commands::Validate(args) => commands::validate::run(config, &cli.data_dir, args)?,
        Commands::Plan(args) => commands::plan::run(args)?,
    }

    Ok(())
}
