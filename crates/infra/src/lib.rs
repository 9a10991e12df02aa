//! Concrete adapters for the engine's seams.
//!
//! - [`HttpVendorTransport`]: XML over HTTP POST to the vendor
//! - [`FileBlobStore`]: versioned blobs as JSON files in a directory
//! - [`StaticCountryDirectory`]: built-in ISO code to country title table
//! - [`FilePlanDirectory`]: billing plans loaded from a JSON file

pub mod countries;
pub mod file_store;
pub mod http;
pub mod plan_file;

pub use countries::StaticCountryDirectory;
pub use file_store::FileBlobStore;
pub use http::HttpVendorTransport;
pub use plan_file::{FilePlanDirectory, PlanFileError, PlanRecord};
