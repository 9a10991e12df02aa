//! `plan`: preview a schedule without touching any store.

use anyhow::Result;

use podship_core::Quantity;
use podship_plans::{InvoicePlan, PlanFields, PlanSnapshot, ShipmentHistory, ShipmentPlanner, package_index};

use crate::cli::PlanArgs;

pub fn run(args: PlanArgs) -> Result<()> {
    let snapshot = PlanSnapshot::from_fields(&PlanFields::with_products(args.schedule).always_ship(args.always_ship));
    let history = ShipmentHistory::from_field(&args.shipped);
    let quantity = Quantity::new(args.quantity)?;

    let plan = ShipmentPlanner::new().plan_invoice(args.payments, [(&snapshot, quantity)], &history);
    println!(
        "payment {} -> package {} of {}",
        args.payments,
        package_index(args.payments) + 1,
        snapshot.schedule.len()
    );

    match plan {
        InvoicePlan::NotApplicable => println!("schedule is empty"),
        InvoicePlan::NothingToShip { exhausted_lines, .. } if exhausted_lines > 0 => {
            println!("schedule exhausted")
        }
        InvoicePlan::NothingToShip { .. } => println!("customer already has every product in this package"),
        InvoicePlan::Ship(items) => {
            for item in items {
                println!("  {} x{}", item.product_id, item.quantity);
            }
        }
    }

    Ok(())
}
