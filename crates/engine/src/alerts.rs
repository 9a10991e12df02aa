//! Admin alert wording.

use podship_inventory::SweepReport;
use podship_vendor::{Stage, VendorError, VendorErrorCategory};

use crate::collaborators::InvoiceSnapshot;
use crate::error::{CommitStep, ValidationError};

/// Subject and body of one admin alert, before the notifier wraps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// "{name} (id:{customer})"
fn who(invoice: &InvoiceSnapshot) -> String {
    format!("{} (id:{})", invoice.customer.display_name(), invoice.customer.id)
}

pub fn nothing_to_ship(invoice: &InvoiceSnapshot) -> Alert {
    Alert {
        subject: format!(
            "Nothing available to ship to {} in: {}",
            invoice.customer.display_name(),
            invoice.line_description
        ),
        body: format!(
            "You have just received a payment from {} but you have no products left to ship them in: {}. \
             Either they have the products already or you have run out of products to ship.",
            who(invoice),
            invoice.line_description
        ),
    }
}

pub fn address_rejected(invoice: &InvoiceSnapshot, errors: &[ValidationError]) -> Alert {
    let reasons = errors.iter().map(|e| format!("- {e}")).collect::<Vec<_>>().join("\n");
    Alert {
        subject: format!("Cannot ship to {}!", who(invoice)),
        body: format!(
            "Could not ship to {} because the shipping address on invoice {} is not usable:\n\n{reasons}",
            who(invoice),
            invoice.invoice_id
        ),
    }
}

pub fn vendor_failed(invoice: &InvoiceSnapshot, error: &VendorError) -> Alert {
    let subject = match (error.category(), error.stage()) {
        (VendorErrorCategory::Business, _) => format!("Shipping costs over limit for {}!", who(invoice)),
        (VendorErrorCategory::Protocol, Stage::Quote) => {
            format!("Could not get shipping options for {}!", who(invoice))
        }
        _ => format!("Order failed for {}!", who(invoice)),
    };

    let body = match error {
        VendorError::CostExceeded { option, max } => format!(
            "Could not ship to {} because the cheapest shipping quote ({}: ${}) was over the maximum shipping cost (${max}).",
            who(invoice),
            option.description,
            option.price
        ),
        VendorError::Transport { stage, source } => format!(
            "Could not ship to {} because the {stage} request could not be completed: {source}. Please process manually.",
            who(invoice)
        ),
        VendorError::Rejected { stage, code, text } => format!(
            "Could not ship to {} because the vendor returned a {stage} error whilst ordering: {}\n\n(Code: {code}) {text}",
            who(invoice),
            invoice.line_description
        ),
        other => format!(
            "Could not ship to {} whilst ordering: {}\n\n{other}",
            who(invoice),
            invoice.line_description
        ),
    };

    Alert { subject, body }
}

pub fn commit_failed(invoice: &InvoiceSnapshot, vendor_order_id: Option<&str>, step: CommitStep, reason: &str) -> Alert {
    let state = match step {
        CommitStep::History => "Neither their shipped products nor the inventory were updated.",
        CommitStep::Inventory => "Their shipped products were recorded but the inventory was not updated.",
    };
    Alert {
        subject: format!("Order placed but not recorded for {}!", who(invoice)),
        body: format!(
            "The vendor accepted the order for {} (vendor order: {}) but the {step} could not be saved: {reason}\n\n\
             {state} Check them before the next billing cycle.",
            who(invoice),
            vendor_order_id.unwrap_or("unknown"),
        ),
    }
}

pub fn history_unavailable(invoice: &InvoiceSnapshot, reason: &str) -> Alert {
    Alert {
        subject: format!("Order failed for {}!", who(invoice)),
        body: format!(
            "Could not ship to {} because their shipped products could not be read: {reason}. Please process manually.",
            who(invoice)
        ),
    }
}

pub fn inventory_expiry(report: &SweepReport, expire_after_days: u32) -> Alert {
    let lines = report
        .alerts
        .iter()
        .map(|(product_id, days)| format!("{product_id}, last ordered {days} days ago"))
        .collect::<Vec<_>>()
        .join("\n");
    Alert {
        subject: "Product expiry warning!".to_string(),
        body: format!(
            "Products not ordered for {expire_after_days} days are deleted automatically by the vendor without warning. \
             The following products MAY be at risk of deletion unless they have been ordered elsewhere:\n\n{lines}\n"
        ),
    }
}
