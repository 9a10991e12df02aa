//! Fulfillment orchestration.
//!
//! Wires the planner, vendor client, inventory tracker and notifier
//! together behind three entry points:
//! - [`FulfillmentEngine::on_order_trigger`]: an invoice started or a payment arrived
//! - [`FulfillmentEngine::on_daily_sweep`]: inventory aging check
//! - [`FulfillmentEngine::validate_address`]: pre-submit address check
//!
//! Entry points never return errors. Failures are logged, reported to the
//! admin and summarized in the returned outcome.

pub mod address;
pub mod alerts;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;

pub use address::{AddressRequest, RequestedProduct, ShippingAddress, VENDOR_COUNTRIES, check_address, vendor_country};
pub use collaborators::{
    BillingPlanDirectory, BlobShipmentHistoryStore, CountryDirectory, Customer, InMemoryCountryDirectory,
    InMemoryPlanDirectory, InvoiceLine, InvoiceSnapshot, SHIPPED_BLOB_PREFIX, ShipmentHistoryStore,
};
pub use config::{ConfigError, EngineConfig, FeatureFlags, InventoryConfig, VendorConfig};
pub use engine::{Collaborators, FulfillmentEngine, OrderTrigger};
pub use error::{CommitStep, ErrorKind, FulfillmentError, ValidationError};
pub use outcome::{FulfillmentOutcome, IgnoreReason, ShipmentReceipt, SweepOutcome};
