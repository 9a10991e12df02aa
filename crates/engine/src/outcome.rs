//! What the entry points report back.

use podship_core::AttemptId;
use podship_plans::PlannedItem;
use podship_vendor::{OrderMode, ShippingOption};

use crate::error::ErrorKind;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Vendor credentials are missing.
    NotConfigured,
    /// A first-payment event; the invoice-started event covers that cycle.
    FirstPaymentHandledAtStart,
}

impl core::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            IgnoreReason::NotConfigured => "vendor credentials not configured",
            IgnoreReason::FirstPaymentHandledAtStart => "first payment is handled when the invoice starts",
        })
    }
}

/// A completed shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentReceipt {
    pub attempt_id: AttemptId,
    pub items: Vec<PlannedItem>,
    pub shipping: ShippingOption,
    pub vendor_order_id: Option<String>,
    pub mode: OrderMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    Ignored(IgnoreReason),
    /// No line on the invoice carries a fulfillment schedule.
    NotApplicable,
    Shipped(ShipmentReceipt),
    /// Already logged and reported to the admin.
    Failed { kind: ErrorKind, message: String },
}

impl FulfillmentOutcome {
    pub fn is_shipped(&self) -> bool {
        matches!(self, FulfillmentOutcome::Shipped(_))
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            FulfillmentOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Inventory checking is switched off.
    Disabled,
    /// Nothing is being tracked.
    Empty,
    Completed { alerted: usize, pruned: usize },
    Failed { message: String },
}
