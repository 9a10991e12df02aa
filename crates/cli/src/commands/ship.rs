//! `ship`: run one fulfillment cycle for an invoice.

use std::path::Path;

use anyhow::Result;

use podship_engine::{EngineConfig, FulfillmentOutcome, InvoiceSnapshot};

use crate::cli::ShipArgs;

pub fn run(config: EngineConfig, data_dir: &Path, args: ShipArgs) -> Result<()> {
    let invoice: InvoiceSnapshot = super::read_json(&args.invoice)?;
    let engine = super::build_engine(config, data_dir, super::load_plans(&args.plans)?)?;

    match engine.on_order_trigger(args.trigger.into(), &invoice) {
        FulfillmentOutcome::Ignored(reason) => println!("ignored: {reason}"),
        FulfillmentOutcome::NotApplicable => println!("nothing to do: no line has a product schedule"),
        FulfillmentOutcome::Shipped(receipt) => {
            println!(
                "shipped ({}) via {} at ${}, vendor order {}",
                receipt.mode,
                receipt.shipping.description,
                receipt.shipping.price,
                receipt.vendor_order_id.as_deref().unwrap_or("-")
            );
            for item in &receipt.items {
                println!("  {} x{}", item.product_id, item.quantity);
            }
        }
        FulfillmentOutcome::Failed { kind, message } => println!("failed ({kind}): {message}"),
    }

    Ok(())
}
