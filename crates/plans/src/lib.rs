//! Billing-plan product schedules and per-cycle shipment planning.
//!
//! Pure, deterministic logic: no IO, no clocks. Callers hand in plan
//! fields, payment counts and shipment history and get back the exact
//! list of products to ship this cycle.

pub mod history;
pub mod planner;
pub mod schedule;
pub mod snapshot;

pub use history::ShipmentHistory;
pub use planner::{InvoicePlan, LinePlan, PlannedItem, ShipmentPlanner, package_index, plan_line};
pub use schedule::{Package, ProductSchedule};
pub use snapshot::{PlanFields, PlanSnapshot};
