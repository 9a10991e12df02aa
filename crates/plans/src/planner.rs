//! Shipment planning: which products ship this billing cycle.
//!
//! Two tiers:
//! - **line level** (`plan_line`): one invoice line, one schedule. An
//!   exhausted schedule is not an error here, the line just ships nothing.
//! - **invoice level** (`ShipmentPlanner::plan_invoice`): all lines together.
//!   If at least one line carries a schedule but nothing at all can ship,
//!   the result is `InvoicePlan::NothingToShip`, which callers report.

use serde::Serialize;
use tracing::debug;

use podship_core::{ProductId, Quantity};

use crate::history::ShipmentHistory;
use crate::schedule::ProductSchedule;
use crate::snapshot::PlanSnapshot;

/// One product to ship, with the number of copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Result of planning a single invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinePlan {
    pub items: Vec<PlannedItem>,
    /// The payment count points past the end of the schedule.
    pub schedule_exhausted: bool,
}

/// Zero-based package index for a payment count.
///
/// The first payment ships package 0; a count of 0 (free signup, invoice
/// started before any payment) also maps to package 0.
pub fn package_index(payment_count: u32) -> usize {
    payment_count.saturating_sub(1) as usize
}

/// Plan one line: pick the package for this cycle and drop anything the
/// customer already has, unless `always_ship` is set.
pub fn plan_line(
    payment_count: u32,
    schedule: &ProductSchedule,
    history: &ShipmentHistory,
    always_ship: bool,
    quantity: Quantity,
) -> LinePlan {
    let index = package_index(payment_count);
    let Some(package) = schedule.package_at(index) else {
        debug!(index, packages = schedule.len(), "schedule exhausted");
        return LinePlan {
            items: Vec::new(),
            schedule_exhausted: true,
        };
    };

    let items = package
        .products()
        .iter()
        .filter(|product_id| always_ship || !history.contains(product_id))
        .map(|product_id| PlannedItem {
            product_id: product_id.clone(),
            quantity,
        })
        .collect();

    LinePlan {
        items,
        schedule_exhausted: false,
    }
}

/// Result of planning a whole invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoicePlan {
    /// No line carries a fulfillment schedule; nothing to do, nothing to report.
    NotApplicable,
    /// Fulfillment lines exist but every one of them came up empty.
    NothingToShip {
        fulfillment_lines: usize,
        exhausted_lines: usize,
    },
    /// Ship these items (non-empty, one entry per product).
    Ship(Vec<PlannedItem>),
}

impl InvoicePlan {
    pub fn items(&self) -> &[PlannedItem] {
        match self {
            InvoicePlan::Ship(items) => items,
            _ => &[],
        }
    }
}

/// Aggregates line plans into an invoice plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShipmentPlanner;

impl ShipmentPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Plan every line of an invoice against one customer history.
    ///
    /// Lines whose snapshot has no schedule are skipped silently. When two
    /// lines yield the same product, quantities are summed into the first
    /// entry so the vendor never sees the same product twice.
    pub fn plan_invoice<'a>(
        &self,
        payment_count: u32,
        lines: impl IntoIterator<Item = (&'a PlanSnapshot, Quantity)>,
        history: &ShipmentHistory,
    ) -> InvoicePlan {
        let mut fulfillment_lines = 0usize;
        let mut exhausted_lines = 0usize;
        let mut merged: Vec<PlannedItem> = Vec::new();

        for (snapshot, quantity) in lines {
            if !snapshot.is_fulfillment_bearing() {
                continue;
            }
            fulfillment_lines += 1;

            let line = plan_line(
                payment_count,
                &snapshot.schedule,
                history,
                snapshot.always_ship,
                quantity,
            );
            if line.schedule_exhausted {
                exhausted_lines += 1;
            }

            for item in line.items {
                match merged.iter_mut().find(|m| m.product_id == item.product_id) {
                    Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
                    None => merged.push(item),
                }
            }
        }

        if fulfillment_lines == 0 {
            InvoicePlan::NotApplicable
        } else if merged.is_empty() {
            InvoicePlan::NothingToShip {
                fulfillment_lines,
                exhausted_lines,
            }
        } else {
            InvoicePlan::Ship(merged)
        }
    }
}
