//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use podship_engine::OrderTrigger;

#[derive(Parser)]
#[command(name = "podship")]
#[command(version)]
#[command(about = "Ship subscription products through a print-on-demand vendor", long_about = None)]
pub struct Cli {
    /// TOML config file; PODSHIP_* environment variables override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding shipment history and inventory blobs
    #[arg(long, global = true, default_value = "./podship-data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ship the current cycle of an invoice
    Ship(ShipArgs),

    /// Run the inventory aging check
    Sweep,

    /// Check a signup/order form's shipping address
    Validate(ValidateArgs),

    /// Show what a schedule ships for a payment count (no IO)
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
pub struct ShipArgs {
    /// Invoice snapshot (JSON)
    #[arg(long)]
    pub invoice: PathBuf,

    /// Billing plans file (JSON)
    #[arg(long)]
    pub plans: PathBuf,

    /// Host event that triggered this run
    #[arg(long, value_enum, default_value = "payment-received")]
    pub trigger: Trigger,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Address request (JSON)
    #[arg(long)]
    pub request: PathBuf,

    /// Billing plans file (JSON)
    #[arg(long)]
    pub plans: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Schedule text, e.g. "A,B:C,D"
    #[arg(long)]
    pub schedule: String,

    /// Number of payments made so far
    #[arg(long)]
    pub payments: u32,

    /// Comma-separated products the customer already has
    #[arg(long, default_value = "")]
    pub shipped: String,

    /// Ship even products the customer already has
    #[arg(long, default_value = "false")]
    pub always_ship: bool,

    /// Copies of each product
    #[arg(long, default_value = "1")]
    pub quantity: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// A recurring invoice was started
    InvoiceStarted,
    /// A payment was received
    PaymentReceived,
}

impl From<Trigger> for OrderTrigger {
    fn from(trigger: Trigger) -> Self {
        match trigger {
            Trigger::InvoiceStarted => OrderTrigger::InvoiceStarted,
            Trigger::PaymentReceived => OrderTrigger::PaymentReceived,
        }
    }
}
