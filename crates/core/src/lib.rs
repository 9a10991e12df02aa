//! `podship-core`: shared building blocks for the fulfillment workspace.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;
pub mod version;

pub use error::DomainError;
pub use id::{AttemptId, CustomerId, ProductId};
pub use value_object::{Price, Quantity, ValueObject};
pub use version::{ExpectedVersion, Versioned};
