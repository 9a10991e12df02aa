//! Vendor-side product aging tracker.
//!
//! The vendor silently deletes products that have not been ordered for a
//! while. This crate remembers when each product last shipped, flags the
//! ones getting close to deletion and forgets the ones already past it.
//!
//! The record is one process-wide blob, rewritten wholesale. Writes go
//! through `InventoryRepository`, which uses optimistic versioning so that
//! two concurrent orders cannot lose each other's timestamps.

pub mod record;
pub mod repository;
pub mod store;

pub use record::{AgingPolicy, InventoryRecord, SweepReport};
pub use repository::{INVENTORY_BLOB_KEY, InventoryRepository};
pub use store::{BlobStore, InMemoryBlobStore, StoreError, VersionedBlob};
