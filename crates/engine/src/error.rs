//! Fulfillment error taxonomy.

use thiserror::Error;

use podship_inventory::StoreError;
use podship_vendor::{VendorError, VendorErrorCategory};

/// Coarse failure class for logs, alerts and outcomes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or unsupported shipping address.
    Validation,
    /// Network failure, timeout or non-200 status talking to the vendor.
    Transport,
    /// The vendor answered with an error code or an unusable body.
    Protocol,
    /// A local rule stopped the order (cost cap, nothing left to ship).
    Business,
    /// Reading or writing local state failed.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Business => "business",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VendorErrorCategory> for ErrorKind {
    fn from(category: VendorErrorCategory) -> Self {
        match category {
            VendorErrorCategory::Transport => ErrorKind::Transport,
            VendorErrorCategory::Protocol => ErrorKind::Protocol,
            VendorErrorCategory::Business => ErrorKind::Business,
        }
    }
}

/// Address problem, naming the products that cannot be shipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Sorry, we cannot ship \"{}\" to your country", .products.join("\", \""))]
    UnsupportedCountry { products: Vec<String> },

    #[error("Please specify your full shipping address to order \"{}\"", .products.join("\", \""))]
    IncompleteAddress { products: Vec<String> },
}

impl ValidationError {
    pub fn products(&self) -> &[String] {
        match self {
            ValidationError::UnsupportedCountry { products } | ValidationError::IncompleteAddress { products } => {
                products
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("address rejected: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("nothing left to ship in '{line_description}'")]
    NothingToShip { line_description: String },

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("could not load shipment history: {0}")]
    History(#[source] StoreError),

    /// The vendor accepted the order but local records were not updated.
    #[error("order placed but {step} not recorded: {source}")]
    Commit {
        vendor_order_id: Option<String>,
        step: CommitStep,
        #[source]
        source: StoreError,
    },
}

/// Local write made after the vendor confirms an order, in commit order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommitStep {
    /// The customer's shipped products. Written first; nothing else is
    /// written when it fails.
    History,
    /// The shared inventory aging record.
    Inventory,
}

impl core::fmt::Display for CommitStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            CommitStep::History => "shipment history",
            CommitStep::Inventory => "inventory",
        })
    }
}

impl FulfillmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::Validation(_) => ErrorKind::Validation,
            FulfillmentError::NothingToShip { .. } => ErrorKind::Business,
            FulfillmentError::Vendor(e) => e.category().into(),
            FulfillmentError::History(_) | FulfillmentError::Commit { .. } => ErrorKind::Persistence,
        }
    }
}

fn join_messages<E: core::fmt::Display>(errors: &[E]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use podship_vendor::{Stage, TransportError};

    #[test]
    fn vendor_failures_map_onto_kinds() {
        let transport = FulfillmentError::from(VendorError::transport(Stage::Order, TransportError::Timeout));
        assert_eq!(transport.kind(), ErrorKind::Transport);

        let protocol = FulfillmentError::from(VendorError::NoShippingOptions);
        assert_eq!(protocol.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn local_failures_map_onto_kinds() {
        assert_eq!(
            FulfillmentError::NothingToShip {
                line_description: "DVD Club".into()
            }
            .kind(),
            ErrorKind::Business
        );
        assert_eq!(
            FulfillmentError::Commit {
                vendor_order_id: None,
                step: CommitStep::History,
                source: StoreError::Backend("disk full".into()),
            }
            .kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn validation_messages_list_products() {
        let err = ValidationError::UnsupportedCountry {
            products: vec!["DVD Club".into(), "Box Set".into()],
        };
        assert_eq!(err.to_string(), "Sorry, we cannot ship \"DVD Club\", \"Box Set\" to your country");

        let wrapped = FulfillmentError::Validation(vec![
            err,
            ValidationError::IncompleteAddress {
                products: vec!["DVD Club".into()],
            },
        ]);
        assert_eq!(wrapped.kind(), ErrorKind::Validation);
        assert!(wrapped.to_string().contains("full shipping address"));
    }
}
