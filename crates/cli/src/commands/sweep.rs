//! `sweep`: daily inventory aging check.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use podship_engine::{EngineConfig, SweepOutcome};
use podship_infra::FilePlanDirectory;

pub fn run(config: EngineConfig, data_dir: &Path) -> Result<()> {
    let engine = super::build_engine(config, data_dir, Arc::new(FilePlanDirectory::default()))?;

    match engine.on_daily_sweep() {
        SweepOutcome::Disabled => println!("inventory checking is disabled"),
        SweepOutcome::Empty => println!("no products tracked"),
        SweepOutcome::Completed { alerted, pruned } => {
            println!("{alerted} product(s) near expiry, {pruned} pruned")
        }
        SweepOutcome::Failed { message } => println!("sweep failed: {message}"),
    }

    Ok(())
}
