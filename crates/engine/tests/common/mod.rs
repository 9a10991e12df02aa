#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use podship_core::{CustomerId, ProductId, Quantity};
use podship_engine::{
    BlobShipmentHistoryStore, Collaborators, Customer, EngineConfig, FulfillmentEngine, InMemoryCountryDirectory,
    InMemoryPlanDirectory, InvoiceLine, InvoiceSnapshot, ShipmentHistoryStore, ShippingAddress,
};
use podship_inventory::{InMemoryBlobStore, StoreError};
use podship_plans::ShipmentHistory;
use podship_notify::InMemoryMailer;
use podship_plans::PlanFields;
use podship_vendor::RecordingTransport;

pub const QUOTE_OK: &str = "<HTML><BODY><Response><ErrorCode>0</ErrorCode><ErrorText>success</ErrorText>\
    <Option><Description>Ground</Description><Price>12.50</Price></Option>\
    <Option><Description>Air</Description><Price>9.99</Price></Option>\
    <Option><Description>Express</Description><Price>30.00</Price></Option>\
    </Response></BODY></HTML>";

pub const ORDER_OK: &str =
    "<Response><ErrorCode>0</ErrorCode><ErrorText>success</ErrorText><OrderId>5150</OrderId></Response>";

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 0).unwrap()
}

pub fn config() -> EngineConfig {
    EngineConfig::from_toml_str(
        r#"
        [vendor]
        user_id = "shop@example.com"
        password = "secret"

        [features]
        check_inventory = true

        [alerts]
        enabled = true
        site_admin_email = "admin@example.com"
        site_title = "Film Club"
        "#,
    )
    .unwrap()
}

pub type HistoryStore = Arc<BlobShipmentHistoryStore<Arc<InMemoryBlobStore>>>;

/// History store whose reads or writes fail on demand.
pub struct FlakyHistory {
    pub inner: HistoryStore,
    pub fail_load: bool,
    pub fail_record: bool,
}

impl FlakyHistory {
    pub fn failing_load(inner: HistoryStore) -> Self {
        Self {
            inner,
            fail_load: true,
            fail_record: false,
        }
    }

    pub fn failing_record(inner: HistoryStore) -> Self {
        Self {
            inner,
            fail_load: false,
            fail_record: true,
        }
    }
}

impl ShipmentHistoryStore for FlakyHistory {
    fn load(&self, customer: &CustomerId) -> Result<ShipmentHistory, StoreError> {
        if self.fail_load {
            return Err(StoreError::Backend("disk unreadable".into()));
        }
        self.inner.load(customer)
    }

    fn record(&self, customer: &CustomerId, products: &[ProductId]) -> Result<ShipmentHistory, StoreError> {
        if self.fail_record {
            return Err(StoreError::Backend("disk full".into()));
        }
        self.inner.record(customer, products)
    }
}

pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub plans: Arc<InMemoryPlanDirectory>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub histories: HistoryStore,
    pub mailer: Arc<InMemoryMailer>,
    pub engine: FulfillmentEngine,
}

impl Harness {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_mailer(config, InMemoryMailer::new())
    }

    pub fn with_mailer(config: EngineConfig, mailer: InMemoryMailer) -> Self {
        Self::build(config, mailer, |histories| histories as Arc<dyn ShipmentHistoryStore>)
    }

    /// Route the engine's history access through `wrap`; `histories` still
    /// exposes the underlying store.
    pub fn with_history<H>(config: EngineConfig, wrap: impl FnOnce(HistoryStore) -> H) -> Self
    where
        H: ShipmentHistoryStore + 'static,
    {
        Self::build(config, InMemoryMailer::new(), |histories| {
            Arc::new(wrap(histories)) as Arc<dyn ShipmentHistoryStore>
        })
    }

    fn build(
        config: EngineConfig,
        mailer: InMemoryMailer,
        wrap: impl FnOnce(HistoryStore) -> Arc<dyn ShipmentHistoryStore>,
    ) -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let plans = Arc::new(InMemoryPlanDirectory::new().with_title("7", "DVD of the Month"));
        let blobs = Arc::new(InMemoryBlobStore::new());
        let histories = Arc::new(BlobShipmentHistoryStore::new(blobs.clone()));
        let mailer = Arc::new(mailer);
        let countries = Arc::new(InMemoryCountryDirectory::from_pairs([
            ("US", "United States"),
            ("CA", "Canada"),
            ("GB", "United Kingdom"),
            ("HK", "Hong Kong SAR"),
            ("IN", "India"),
        ]));

        let engine = FulfillmentEngine::new(
            config,
            Collaborators {
                transport: transport.clone(),
                plans: plans.clone(),
                countries,
                history: wrap(histories.clone()),
                blobs: blobs.clone(),
                mailer: mailer.clone(),
            },
        );

        Self {
            transport,
            plans,
            blobs,
            histories,
            mailer,
            engine,
        }
    }
}

pub fn customer() -> CustomerId {
    CustomerId::parse("42").unwrap()
}

pub fn invoice(payments_count: u32, schedule: &str) -> InvoiceSnapshot {
    InvoiceSnapshot {
        invoice_id: "INV-1".into(),
        customer: Customer {
            id: customer(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
        },
        address: ShippingAddress {
            street: "1 Main St".into(),
            city: "Albany".into(),
            state: "NY".into(),
            postal_code: "12207".into(),
            country: "US".into(),
        },
        payments_count,
        line_description: "DVD of the Month".into(),
        lines: vec![line("7", "3", schedule, 1)],
    }
}

pub fn line(product_id: &str, billing_plan_id: &str, schedule: &str, quantity: u32) -> InvoiceLine {
    InvoiceLine {
        product_id: product_id.into(),
        billing_plan_id: billing_plan_id.into(),
        quantity: Quantity::new(quantity).unwrap(),
        purchased_plan: if schedule.is_empty() {
            PlanFields::default()
        } else {
            PlanFields::with_products(schedule)
        },
    }
}
