//! `validate`: pre-submit shipping address check.

use std::path::Path;

use anyhow::Result;

use podship_engine::{AddressRequest, EngineConfig};

use crate::cli::ValidateArgs;

pub fn run(config: EngineConfig, data_dir: &Path, args: ValidateArgs) -> Result<()> {
    let request: AddressRequest = super::read_json(&args.request)?;
    let engine = super::build_engine(config, data_dir, super::load_plans(&args.plans)?)?;

    let errors = engine.validate_address(&request);
    if errors.is_empty() {
        println!("address ok");
    }
    for error in &errors {
        println!("{error}");
    }
    Ok(())
}
