use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use podship_core::ProductId;

const SECONDS_PER_DAY: i64 = 86_400;

/// Aging thresholds, in whole days since a product last shipped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingPolicy {
    /// At or past this age the product is reported to the admin.
    pub alert_after_days: u32,
    /// At or past this age the vendor has deleted the product; stop tracking it.
    pub expire_after_days: u32,
}

impl Default for AgingPolicy {
    fn default() -> Self {
        Self {
            alert_after_days: 150,
            expire_after_days: 180,
        }
    }
}

impl AgingPolicy {
    fn alert_after(&self) -> Duration {
        Duration::days(i64::from(self.alert_after_days))
    }

    fn expire_after(&self) -> Duration {
        Duration::days(i64::from(self.expire_after_days))
    }
}

/// Last-shipped Unix timestamp (seconds) per product.
///
/// Shared by all customers: it tracks vendor-side activity, not who got what.
/// Serialized as a flat JSON object, `{"<product id>": <unix seconds>}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryRecord {
    last_shipped: BTreeMap<ProductId, i64>,
}

impl InventoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.last_shipped.is_empty()
    }

    pub fn len(&self) -> usize {
        self.last_shipped.len()
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.last_shipped.contains_key(product_id)
    }

    pub fn last_shipped(&self, product_id: &ProductId) -> Option<DateTime<Utc>> {
        self.last_shipped
            .get(product_id)
            .and_then(|ts| DateTime::from_timestamp(*ts, 0))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, i64)> {
        self.last_shipped.iter().map(|(k, v)| (k, *v))
    }

    /// Stamp each product as shipped at `now`.
    pub fn touch<'a>(&mut self, products: impl IntoIterator<Item = &'a ProductId>, now: DateTime<Utc>) {
        let ts = now.timestamp();
        for product_id in products {
            self.last_shipped.insert(product_id.clone(), ts);
        }
    }

    /// Owned variant of [`InventoryRecord::touch`].
    pub fn touched<'a>(mut self, products: impl IntoIterator<Item = &'a ProductId>, now: DateTime<Utc>) -> Self {
        self.touch(products, now);
        self
    }

    /// Classify every entry by age.
    ///
    /// An entry past the expiry threshold is both alerted (this one last
    /// time) and removed from `retained`. Timestamps in the future count as
    /// age zero.
    pub fn sweep(&self, now: DateTime<Utc>, policy: &AgingPolicy) -> SweepReport {
        let now_ts = now.timestamp();
        let alert_after = policy.alert_after().num_seconds();
        let expire_after = policy.expire_after().num_seconds();

        let mut alerts = BTreeMap::new();
        let mut expired = Vec::new();
        let mut retained = BTreeMap::new();

        for (product_id, ts) in &self.last_shipped {
            let age = now_ts.saturating_sub(*ts).max(0);

            if age >= alert_after {
                let days = u32::try_from(age / SECONDS_PER_DAY).unwrap_or(u32::MAX);
                alerts.insert(product_id.clone(), days);
            }

            if age >= expire_after {
                expired.push(product_id.clone());
            } else {
                retained.insert(product_id.clone(), *ts);
            }
        }

        SweepReport {
            alerts,
            expired,
            retained: InventoryRecord { last_shipped: retained },
        }
    }
}

/// Outcome of one aging sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Products at or past the alert threshold, with whole days since last shipment.
    pub alerts: BTreeMap<ProductId, u32>,
    /// Products removed because they are at or past the expiry threshold.
    pub expired: Vec<ProductId>,
    /// The record with expired products removed.
    pub retained: InventoryRecord,
}

impl SweepReport {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    pub fn pruned_anything(&self) -> bool {
        !self.expired.is_empty()
    }
}
