//! Subcommand implementations.

pub mod plan;
pub mod ship;
pub mod sweep;
pub mod validate;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use podship_engine::{BillingPlanDirectory, BlobShipmentHistoryStore, Collaborators, EngineConfig, FulfillmentEngine};
use podship_infra::{FileBlobStore, FilePlanDirectory, HttpVendorTransport, StaticCountryDirectory};
use podship_notify::LogMailer;

/// Wire the engine to the file store under `data_dir` and the real vendor.
fn build_engine(config: EngineConfig, data_dir: &Path, plans: Arc<dyn BillingPlanDirectory>) -> Result<FulfillmentEngine> {
    let blobs = Arc::new(
        FileBlobStore::open(data_dir).with_context(|| format!("failed to open data dir {}", data_dir.display()))?,
    );
    let transport = HttpVendorTransport::from_config(&config.vendor).context("failed to build HTTP client")?;

    let parts = Collaborators {
        transport: Arc::new(transport),
        plans,
        countries: Arc::new(StaticCountryDirectory::new()),
        history: Arc::new(BlobShipmentHistoryStore::new(blobs.clone())),
        blobs,
        mailer: Arc::new(LogMailer::new()),
    };
    Ok(FulfillmentEngine::new(config, parts))
}

fn load_plans(path: &Path) -> Result<Arc<dyn BillingPlanDirectory>> {
    Ok(Arc::new(FilePlanDirectory::load(path)?))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
