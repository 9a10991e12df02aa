//! Billing-plan fulfillment fields and the snapshot used for one cycle.

use serde::{Deserialize, Serialize};

use crate::schedule::ProductSchedule;

/// Fulfillment custom fields as stored on a billing plan.
///
/// The host keeps two copies: the live plan, and the copy captured on the
/// invoice line at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanFields {
    /// Raw schedule text, e.g. `"A,B:C,D"`.
    pub products: Option<String>,
    /// Re-ship products even when the customer already has them.
    pub always_ship: bool,
    /// Use the live schedule instead of the purchase-time copy.
    pub always_fresh: bool,
}

impl PlanFields {
    pub fn with_products(products: impl Into<String>) -> Self {
        Self {
            products: Some(products.into()),
            ..Self::default()
        }
    }

    pub fn always_ship(mut self, value: bool) -> Self {
        self.always_ship = value;
        self
    }

    pub fn always_fresh(mut self, value: bool) -> Self {
        self.always_fresh = value;
        self
    }

    /// True when the schedule text has any non-whitespace content.
    pub fn has_schedule_text(&self) -> bool {
        self.products.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

/// Immutable view of the plan data that drives one fulfillment cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanSnapshot {
    pub schedule: ProductSchedule,
    pub always_ship: bool,
    pub always_fresh: bool,
}

impl PlanSnapshot {
    pub fn from_fields(fields: &PlanFields) -> Self {
        Self {
            schedule: fields
                .products
                .as_deref()
                .map(ProductSchedule::parse)
                .unwrap_or_default(),
            always_ship: fields.always_ship,
            always_fresh: fields.always_fresh,
        }
    }

    /// Pick the live plan when it is flagged "always fresh", otherwise the
    /// purchase-time copy. The flag is read from the live plan because the
    /// purchase-time copy predates any later change to it.
    pub fn resolve(live: Option<&PlanFields>, purchased: &PlanFields) -> Self {
        match live {
            Some(live) if live.always_fresh => Self::from_fields(live),
            _ => Self::from_fields(purchased),
        }
    }

    /// Whether this plan ships anything at all.
    pub fn is_fulfillment_bearing(&self) -> bool {
        !self.schedule.is_empty()
    }
}
