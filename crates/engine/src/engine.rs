use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, info_span, warn};

use podship_core::{AttemptId, ProductId};
use podship_inventory::{BlobStore, InventoryRepository, StoreError};
use podship_notify::{Mailer, Notifier};
use podship_plans::{InvoicePlan, PlanSnapshot, ShipmentPlanner};
use podship_vendor::{FulfillmentClient, OrderLine, Recipient, ShipmentOrder, VendorTransport};

use crate::address::{AddressRequest, check_address, resolve_country};
use crate::alerts::{self, Alert};
use crate::collaborators::{BillingPlanDirectory, CountryDirectory, InvoiceLine, InvoiceSnapshot, ShipmentHistoryStore};
use crate::config::EngineConfig;
use crate::error::{CommitStep, ErrorKind, FulfillmentError, ValidationError};
use crate::outcome::{FulfillmentOutcome, IgnoreReason, ShipmentReceipt, SweepOutcome};

/// Host event that may cause a shipment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderTrigger {
    /// Once per invoice: first payment, or a free signup.
    InvoiceStarted,
    /// Every payment, including the first.
    PaymentReceived,
}

impl OrderTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderTrigger::InvoiceStarted => "invoice_started",
            OrderTrigger::PaymentReceived => "payment_received",
        }
    }
}

/// Everything the engine talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn VendorTransport>,
    pub plans: Arc<dyn BillingPlanDirectory>,
    pub countries: Arc<dyn CountryDirectory>,
    pub history: Arc<dyn ShipmentHistoryStore>,
    /// Holds the shared inventory blob.
    pub blobs: Arc<dyn BlobStore>,
    pub mailer: Arc<dyn Mailer>,
}

/// One invoice line with the plan data that applies this cycle.
struct ResolvedLine<'a> {
    line: &'a InvoiceLine,
    snapshot: PlanSnapshot,
}

pub struct FulfillmentEngine {
    config: EngineConfig,
    client: FulfillmentClient<Arc<dyn VendorTransport>>,
    plans: Arc<dyn BillingPlanDirectory>,
    countries: Arc<dyn CountryDirectory>,
    history: Arc<dyn ShipmentHistoryStore>,
    inventory: InventoryRepository<Arc<dyn BlobStore>>,
    notifier: Notifier,
    planner: ShipmentPlanner,
}

impl FulfillmentEngine {
    pub fn new(config: EngineConfig, parts: Collaborators) -> Self {
        let client = FulfillmentClient::new(parts.transport, config.client_settings());
        let inventory =
            InventoryRepository::new(parts.blobs).with_max_attempts(config.inventory.max_commit_attempts);
        let notifier = Notifier::new(config.alerts.clone(), parts.mailer);

        Self {
            config,
            client,
            plans: parts.plans,
            countries: parts.countries,
            history: parts.history,
            inventory,
            notifier,
            planner: ShipmentPlanner::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn inventory(&self) -> &InventoryRepository<Arc<dyn BlobStore>> {
        &self.inventory
    }

    pub fn on_order_trigger(&self, trigger: OrderTrigger, invoice: &InvoiceSnapshot) -> FulfillmentOutcome {
        self.on_order_trigger_at(trigger, invoice, Utc::now())
    }

    /// Handle an invoice/payment event: plan, quote, order, record.
    ///
    /// Never fails. Problems are logged, sent to the admin and summarized
    /// as [`FulfillmentOutcome::Failed`].
    pub fn on_order_trigger_at(
        &self,
        trigger: OrderTrigger,
        invoice: &InvoiceSnapshot,
        now: DateTime<Utc>,
    ) -> FulfillmentOutcome {
        let attempt_id = AttemptId::new();
        let span = info_span!(
            "fulfillment",
            %attempt_id,
            invoice_id = %invoice.invoice_id,
            customer_id = %invoice.customer.id,
            trigger = trigger.as_str(),
            payments_count = invoice.payments_count,
        );
        let _guard = span.enter();

        if trigger == OrderTrigger::PaymentReceived && invoice.payments_count == 1 {
            debug!("first payment; handled by invoice start");
            return FulfillmentOutcome::Ignored(IgnoreReason::FirstPaymentHandledAtStart);
        }

        if !self.config.is_configured() {
            warn!("vendor credentials missing; not shipping");
            return FulfillmentOutcome::Ignored(IgnoreReason::NotConfigured);
        }

        let lines = self.resolve_lines(invoice);
        if !lines.iter().any(|l| l.snapshot.is_fulfillment_bearing()) {
            debug!("no fulfillment products on invoice");
            return FulfillmentOutcome::NotApplicable;
        }

        match self.ship(attempt_id, invoice, &lines, now) {
            Ok(outcome) => outcome,
            Err(e) => self.report_failure(invoice, e),
        }
    }

    fn resolve_lines<'a>(&self, invoice: &'a InvoiceSnapshot) -> Vec<ResolvedLine<'a>> {
        invoice
            .lines
            .iter()
            .map(|line| {
                let live = self.plans.plan_fields(&line.product_id, &line.billing_plan_id);
                let snapshot = PlanSnapshot::resolve(live.as_ref(), &line.purchased_plan);
                debug!(
                    product_id = %line.product_id,
                    billing_plan_id = %line.billing_plan_id,
                    live = live.as_ref().is_some_and(|f| f.always_fresh),
                    packages = snapshot.schedule.len(),
                    "resolved plan"
                );
                ResolvedLine { line, snapshot }
            })
            .collect()
    }

    fn ship(
        &self,
        attempt_id: AttemptId,
        invoice: &InvoiceSnapshot,
        lines: &[ResolvedLine<'_>],
        now: DateTime<Utc>,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        let customer = &invoice.customer.id;
        let history = self.history.load(customer).map_err(FulfillmentError::History)?;

        let plan = self.planner.plan_invoice(
            invoice.payments_count,
            lines.iter().map(|l| (&l.snapshot, l.line.quantity)),
            &history,
        );

        let items = match plan {
            InvoicePlan::NotApplicable => return Ok(FulfillmentOutcome::NotApplicable),
            InvoicePlan::NothingToShip {
                fulfillment_lines,
                exhausted_lines,
            } => {
                debug!(fulfillment_lines, exhausted_lines, "nothing left to ship");
                return Err(FulfillmentError::NothingToShip {
                    line_description: invoice.line_description.clone(),
                });
            }
            InvoicePlan::Ship(items) => items,
        };
        for item in &items {
            debug!(product_id = %item.product_id, quantity = item.quantity.get(), "going to ship");
        }

        let titles = self.titles(
            lines
                .iter()
                .filter(|l| l.snapshot.is_fulfillment_bearing())
                .map(|l| l.line.product_id.as_str()),
        );
        let recipient = self.recipient(invoice, &titles)?;

        let order = ShipmentOrder {
            recipient,
            lines: items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                })
                .collect(),
        };

        let receipt = self.client.submit(&order)?;
        if let Some(vendor_order_id) = receipt.vendor_order_id.as_deref() {
            info!(vendor_order_id, "vendor order id");
        }

        let shipped: Vec<ProductId> = items.iter().map(|i| i.product_id.clone()).collect();
        self.commit(invoice, &shipped, receipt.vendor_order_id.as_deref(), now)?;

        info!(
            items = items.len(),
            shipping = %receipt.shipping.description,
            mode = %receipt.mode,
            "shipment placed and recorded"
        );

        Ok(FulfillmentOutcome::Shipped(ShipmentReceipt {
            attempt_id,
            items,
            shipping: receipt.shipping,
            vendor_order_id: receipt.vendor_order_id,
            mode: receipt.mode,
        }))
    }

    /// Re-check the address and build the vendor recipient.
    fn recipient(&self, invoice: &InvoiceSnapshot, titles: &[String]) -> Result<Recipient, FulfillmentError> {
        let address = &invoice.address;
        let countries = self.countries.as_ref();

        let errors = check_address(address, titles, countries);
        if !errors.is_empty() {
            return Err(FulfillmentError::Validation(errors));
        }
        let Some(country_name) = resolve_country(&address.country, countries) else {
            return Err(FulfillmentError::Validation(vec![ValidationError::UnsupportedCountry {
                products: titles.to_vec(),
            }]));
        };
        debug!(country = %address.country, country_name, "resolved vendor country");

        Ok(Recipient {
            name: invoice.customer.display_name(),
            street: address.street.trim().to_string(),
            city: address.city.trim().to_string(),
            state: address.state.trim().to_string(),
            postal_code: address.postal_code.trim().to_string(),
            country_code: address.country.trim().to_ascii_uppercase(),
            country_name: country_name.to_string(),
        })
    }

    /// Record a confirmed order in the customer's history, then the inventory.
    ///
    /// The inventory is only touched once the history write succeeded, so a
    /// history failure leaves both records as they were.
    fn commit(
        &self,
        invoice: &InvoiceSnapshot,
        shipped: &[ProductId],
        vendor_order_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), FulfillmentError> {
        let failed = |step: CommitStep, source: StoreError| FulfillmentError::Commit {
            vendor_order_id: vendor_order_id.map(str::to_string),
            step,
            source,
        };

        self.history
            .record(&invoice.customer.id, shipped)
            .map_err(|e| failed(CommitStep::History, e))?;
        self.inventory
            .update(|record| record.touch(shipped, now))
            .map_err(|e| failed(CommitStep::Inventory, e))?;
        Ok(())
    }

    /// Distinct display names of host products, in order.
    fn titles<'a>(&self, product_ids: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        for product_id in product_ids {
            let title = self
                .plans
                .product_title(product_id)
                .unwrap_or_else(|| product_id.to_string());
            if !titles.contains(&title) {
                titles.push(title);
            }
        }
        titles
    }

    fn report_failure(&self, invoice: &InvoiceSnapshot, err: FulfillmentError) -> FulfillmentOutcome {
        let kind = err.kind();
        match kind {
            ErrorKind::Validation | ErrorKind::Business => warn!(kind = %kind, error = %err, "fulfillment stopped"),
            _ => error!(kind = %kind, error = %err, "fulfillment failed"),
        }

        let alert: Alert = match &err {
            FulfillmentError::Validation(errors) => alerts::address_rejected(invoice, errors),
            FulfillmentError::NothingToShip { .. } => alerts::nothing_to_ship(invoice),
            FulfillmentError::Vendor(e) => alerts::vendor_failed(invoice, e),
            FulfillmentError::History(e) => alerts::history_unavailable(invoice, &e.to_string()),
            FulfillmentError::Commit {
                vendor_order_id,
                step,
                source,
            } => alerts::commit_failed(invoice, vendor_order_id.as_deref(), *step, &source.to_string()),
        };
        self.notifier.warn(&alert.subject, &alert.body);

        FulfillmentOutcome::Failed {
            kind,
            message: err.to_string(),
        }
    }

    pub fn on_daily_sweep(&self) -> SweepOutcome {
        self.sweep_at(Utc::now())
    }

    /// Inventory aging check: alert on old products, forget expired ones.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepOutcome {
        let span = info_span!("inventory_sweep");
        let _guard = span.enter();

        if !self.config.features.check_inventory {
            debug!("inventory check disabled");
            return SweepOutcome::Disabled;
        }

        let policy = self.config.aging_policy();
        let result = self.inventory.update(|record| {
            if record.is_empty() {
                return None;
            }
            let report = record.sweep(now, &policy);
            *record = report.retained.clone();
            Some(report)
        });

        let report = match result {
            Ok(Some(report)) => report,
            Ok(None) => {
                debug!("inventory empty");
                return SweepOutcome::Empty;
            }
            Err(e) => {
                error!(error = %e, "inventory sweep failed");
                return SweepOutcome::Failed { message: e.to_string() };
            }
        };

        for product_id in &report.expired {
            info!(%product_id, "product expired; no longer tracked");
        }
        if report.has_alerts() {
            warn!(products = report.alerts.len(), "products at risk of vendor deletion");
            let alert = alerts::inventory_expiry(&report, policy.expire_after_days);
            self.notifier.warn(&alert.subject, &alert.body);
        }

        SweepOutcome::Completed {
            alerted: report.alerts.len(),
            pruned: report.expired.len(),
        }
    }

    /// Address check for a signup/order form. Empty means acceptable.
    ///
    /// Only applies when at least one requested product ships something.
    pub fn validate_address(&self, request: &AddressRequest) -> Vec<ValidationError> {
        let titles = self.titles(
            request
                .products
                .iter()
                .filter(|p| {
                    self.plans
                        .plan_fields(&p.product_id, &p.billing_plan_id)
                        .is_some_and(|f| f.has_schedule_text())
                })
                .map(|p| p.product_id.as_str()),
        );
        if titles.is_empty() {
            return Vec::new();
        }

        let errors = check_address(&request.address, &titles, self.countries.as_ref());
        for e in &errors {
            debug!(error = %e, "address rejected");
        }
        errors
    }
}
