//! What the engine needs from its host: invoice data, billing plans,
//! country names and per-customer shipment history.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use tracing::{debug, warn};

use podship_core::{CustomerId, ExpectedVersion, ProductId, Quantity};
use podship_inventory::{BlobStore, StoreError};
use podship_plans::{PlanFields, ShipmentHistory};

use crate::address::ShippingAddress;

/// Key prefix for per-customer shipment history blobs.
pub const SHIPPED_BLOB_PREFIX: &str = "fulfillment-shipped:";

const HISTORY_WRITE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Customer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

fn one() -> Quantity {
    Quantity::ONE
}

/// One purchased line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoiceLine {
    /// Host product id (not a vendor product id).
    pub product_id: String,
    #[serde(default)]
    pub billing_plan_id: String,
    #[serde(default = "one")]
    pub quantity: Quantity,
    /// Plan fields captured when the line was purchased.
    #[serde(default)]
    pub purchased_plan: PlanFields,
}

/// The invoice as seen when a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoiceSnapshot {
    pub invoice_id: String,
    pub customer: Customer,
    #[serde(default)]
    pub address: ShippingAddress,
    #[serde(default)]
    pub payments_count: u32,
    #[serde(default)]
    pub line_description: String,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
}

/// Live billing plan data.
pub trait BillingPlanDirectory: Send + Sync {
    /// Current fulfillment fields of a product's billing plan, if known.
    fn plan_fields(&self, product_id: &str, billing_plan_id: &str) -> Option<PlanFields>;

    /// Human-readable product title, for messages.
    fn product_title(&self, _product_id: &str) -> Option<String> {
        None
    }
}

impl<D> BillingPlanDirectory for Arc<D>
where
    D: BillingPlanDirectory + ?Sized,
{
    fn plan_fields(&self, product_id: &str, billing_plan_id: &str) -> Option<PlanFields> {
        (**self).plan_fields(product_id, billing_plan_id)
    }

    fn product_title(&self, product_id: &str) -> Option<String> {
        (**self).product_title(product_id)
    }
}

/// Host country titles by ISO alpha-2 code.
pub trait CountryDirectory: Send + Sync {
    fn country_name(&self, code: &str) -> Option<String>;
}

impl<D> CountryDirectory for Arc<D>
where
    D: CountryDirectory + ?Sized,
{
    fn country_name(&self, code: &str) -> Option<String> {
        (**self).country_name(code)
    }
}

/// Per-customer record of products already shipped.
pub trait ShipmentHistoryStore: Send + Sync {
    fn load(&self, customer: &CustomerId) -> Result<ShipmentHistory, StoreError>;

    /// Add products to the customer's history; returns the updated history.
    fn record(&self, customer: &CustomerId, products: &[ProductId]) -> Result<ShipmentHistory, StoreError>;
}

impl<H> ShipmentHistoryStore for Arc<H>
where
    H: ShipmentHistoryStore + ?Sized,
{
    fn load(&self, customer: &CustomerId) -> Result<ShipmentHistory, StoreError> {
        (**self).load(customer)
    }

    fn record(&self, customer: &CustomerId, products: &[ProductId]) -> Result<ShipmentHistory, StoreError> {
        (**self).record(customer, products)
    }
}

/// Shipment history kept as comma-joined text in a blob store, one key
/// per customer.
#[derive(Debug, Clone)]
pub struct BlobShipmentHistoryStore<S> {
    store: S,
}

impl<S: BlobStore> BlobShipmentHistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn key(customer: &CustomerId) -> String {
        format!("{SHIPPED_BLOB_PREFIX}{customer}")
    }

    fn read(&self, key: &str) -> Result<(ShipmentHistory, u64), StoreError> {
        match self.store.get_blob(key)? {
            None => Ok((ShipmentHistory::new(), 0)),
            Some(blob) => {
                let text = String::from_utf8_lossy(&blob.bytes);
                Ok((ShipmentHistory::from_field(&text), blob.version))
            }
        }
    }
}

impl<S: BlobStore> ShipmentHistoryStore for BlobShipmentHistoryStore<S> {
    fn load(&self, customer: &CustomerId) -> Result<ShipmentHistory, StoreError> {
        let (history, _) = self.read(&Self::key(customer))?;
        Ok(history)
    }

    fn record(&self, customer: &CustomerId, products: &[ProductId]) -> Result<ShipmentHistory, StoreError> {
        let key = Self::key(customer);
        let mut attempt = 1;
        loop {
            let (mut history, version) = self.read(&key)?;
            let added = history.record(products);
            if added == 0 {
                return Ok(history);
            }

            match self
                .store
                .set_blob(&key, history.to_field().as_bytes(), ExpectedVersion::Exact(version))
            {
                Ok(_) => {
                    debug!(customer_id = %customer, added, total = history.len(), "shipment history updated");
                    return Ok(history);
                }
                Err(e) if e.is_conflict() && attempt < HISTORY_WRITE_ATTEMPTS => {
                    warn!(customer_id = %customer, attempt, "shipment history write conflicted; retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// In-memory billing plan directory.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPlanDirectory {
    plans: RwLock<HashMap<(String, String), PlanFields>>,
    titles: RwLock<HashMap<String, String>>,
}

impl InMemoryPlanDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product_id: impl Into<String>, billing_plan_id: impl Into<String>, fields: PlanFields) {
        if let Ok(mut plans) = self.plans.write() {
            plans.insert((product_id.into(), billing_plan_id.into()), fields);
        }
    }

    pub fn set_title(&self, product_id: impl Into<String>, title: impl Into<String>) {
        if let Ok(mut titles) = self.titles.write() {
            titles.insert(product_id.into(), title.into());
        }
    }

    pub fn with_plan(self, product_id: &str, billing_plan_id: &str, fields: PlanFields) -> Self {
        self.insert(product_id, billing_plan_id, fields);
        self
    }

    pub fn with_title(self, product_id: &str, title: &str) -> Self {
        self.set_title(product_id, title);
        self
    }
}

impl BillingPlanDirectory for InMemoryPlanDirectory {
    fn plan_fields(&self, product_id: &str, billing_plan_id: &str) -> Option<PlanFields> {
        let plans = self.plans.read().ok()?;
        plans
            .get(&(product_id.to_string(), billing_plan_id.to_string()))
            .cloned()
    }

    fn product_title(&self, product_id: &str) -> Option<String> {
        self.titles.read().ok()?.get(product_id).cloned()
    }
}

/// In-memory country directory.
///
/// Intended for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCountryDirectory {
    names: HashMap<String, String>,
}

impl InMemoryCountryDirectory {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            names: pairs
                .into_iter()
                .map(|(code, name)| (code.to_ascii_uppercase(), name.to_string()))
                .collect(),
        }
    }
}

impl CountryDirectory for InMemoryCountryDirectory {
    fn country_name(&self, code: &str) -> Option<String> {
        self.names.get(&code.trim().to_ascii_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podship_inventory::InMemoryBlobStore;

    fn cid(s: &str) -> CustomerId {
        CustomerId::parse(s).unwrap()
    }

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    #[test]
    fn history_round_trips_through_the_blob() {
        let store = Arc::new(InMemoryBlobStore::new());
        let histories = BlobShipmentHistoryStore::new(store.clone());

        assert!(histories.load(&cid("42")).unwrap().is_empty());

        histories.record(&cid("42"), &[pid("B"), pid("A")]).unwrap();
        let history = histories.record(&cid("42"), &[pid("A"), pid("C")]).unwrap();
        assert_eq!(history.to_field(), "A,B,C");

        let blob = store.get_blob("fulfillment-shipped:42").unwrap().unwrap();
        assert_eq!(blob.bytes, b"A,B,C");
        assert_eq!(blob.version, 2);
        assert!(histories.load(&cid("7")).unwrap().is_empty());
    }

    #[test]
    fn recording_known_products_does_not_write() {
        let store = Arc::new(InMemoryBlobStore::new());
        let histories = BlobShipmentHistoryStore::new(store.clone());
        histories.record(&cid("42"), &[pid("A")]).unwrap();
        histories.record(&cid("42"), &[pid("A")]).unwrap();
        assert_eq!(store.get_blob("fulfillment-shipped:42").unwrap().unwrap().version, 1);
    }

    #[test]
    fn hand_edited_history_is_read_forgivingly() {
        let store = Arc::new(InMemoryBlobStore::new());
        store
            .set_blob("fulfillment-shipped:42", b" A, ,B ,", ExpectedVersion::Any)
            .unwrap();
        let history = BlobShipmentHistoryStore::new(store).load(&cid("42")).unwrap();
        assert!(history.contains(&pid("A")));
        assert!(history.contains(&pid("B")));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn customer_display_name_is_trimmed() {
        let customer = Customer {
            id: cid("1"),
            first_name: "Ann".into(),
            last_name: String::new(),
        };
        assert_eq!(customer.display_name(), "Ann");
    }

    #[test]
    fn invoice_snapshot_reads_from_json() {
        let invoice: InvoiceSnapshot = serde_json::from_str(
            r#"{
                "invoice_id": "INV-1",
                "customer": {"id": "42", "first_name": "Ann", "last_name": "Lee"},
                "address": {"street": "1 Main St", "city": "Albany", "state": "NY", "postal_code": "12207", "country": "US"},
                "payments_count": 2,
                "line_description": "DVD of the Month",
                "lines": [{"product_id": "7", "billing_plan_id": "3", "purchased_plan": {"products": "A,B"}}]
            }"#,
        )
        .unwrap();
        assert_eq!(invoice.lines[0].quantity, Quantity::ONE);
        assert_eq!(invoice.lines[0].purchased_plan.products.as_deref(), Some("A,B"));
        assert_eq!(invoice.customer.display_name(), "Ann Lee");
    }

    #[test]
    fn plan_directory_looks_up_by_product_and_plan() {
        let plans = InMemoryPlanDirectory::new()
            .with_plan("7", "3", PlanFields::with_products("A"))
            .with_title("7", "DVD Club");
        assert!(plans.plan_fields("7", "3").is_some());
        assert!(plans.plan_fields("7", "4").is_none());
        assert_eq!(plans.product_title("7").as_deref(), Some("DVD Club"));
    }
}
