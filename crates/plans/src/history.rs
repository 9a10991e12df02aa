//! Per-customer record of products already shipped.

use std::collections::BTreeSet;

use podship_core::ProductId;

/// Set of products a customer has already received.
///
/// Persisted by the host as a single comma-joined text field, which an
/// operator may edit by hand, so parsing is forgiving: tokens are trimmed
/// and anything unusable is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShipmentHistory {
    shipped: BTreeSet<ProductId>,
}

impl ShipmentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_field(raw: &str) -> Self {
        Self {
            shipped: raw
                .split(',')
                .filter_map(|token| ProductId::parse(token).ok())
                .collect(),
        }
    }

    /// Comma-joined, deduplicated text for the host's customer field.
    pub fn to_field(&self) -> String {
        self.shipped
            .iter()
            .map(ProductId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.shipped.contains(product_id)
    }

    /// Add products; returns how many were not already present.
    pub fn record<'a>(&mut self, products: impl IntoIterator<Item = &'a ProductId>) -> usize {
        products
            .into_iter()
            .filter(|p| self.shipped.insert((*p).clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.shipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shipped.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.shipped.iter()
    }
}

impl FromIterator<ProductId> for ShipmentHistory {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self {
            shipped: iter.into_iter().collect(),
        }
    }
}
