//! Product schedule grammar.
//!
//! ```text
//! schedule := period ("," period)*
//! period   := product (":" product)*
//! ```
//!
//! Each period is one billing cycle; products joined with `:` ship together
//! in that cycle. Tokens are trimmed; empty tokens and empty periods are
//! dropped, so `"A, ,B:"` is the same schedule as `"A,B"`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use podship_core::ProductId;

/// The products to ship together in one billing cycle.
///
/// Order is the order written in the schedule; duplicates are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    products: Vec<ProductId>,
}

impl Package {
    fn from_products(products: impl IntoIterator<Item = ProductId>) -> Self {
        let mut unique: Vec<ProductId> = Vec::new();
        for p in products {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        Self { products: unique }
    }

    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }
}

/// Ordered sequence of packages; index `n` ships on payment `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductSchedule {
    packages: Vec<Package>,
}

impl ProductSchedule {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse raw plan text. Never fails: blank input yields an empty
    /// schedule, which means "this plan does not ship anything".
    pub fn parse(raw: &str) -> Self {
        let packages = raw
            .split(',')
            .map(|period| {
                Package::from_products(period.split(':').filter_map(|token| {
                    let token = token.trim();
                    if token.is_empty() {
                        return None;
                    }
                    match ProductId::parse(token) {
                        Ok(id) => Some(id),
                        Err(e) => {
                            warn!(token, error = %e, "dropping unusable product token from schedule");
                            None
                        }
                    }
                }))
            })
            .filter(|package| !package.is_empty())
            .collect();

        Self { packages }
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Package at a zero-based index, or `None` once the schedule is exhausted.
    pub fn package_at(&self, index: usize) -> Option<&Package> {
        self.packages.get(index)
    }
}

impl core::fmt::Display for ProductSchedule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, package) in self.packages.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            for (j, product) in package.products.iter().enumerate() {
                if j > 0 {
                    f.write_str(":")?;
                }
                f.write_str(product.as_str())?;
            }
        }
        Ok(())
    }
}
