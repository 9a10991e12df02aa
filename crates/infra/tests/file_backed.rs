//! The engine's stores running on top of `FileBlobStore`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use podship_core::{CustomerId, ProductId};
use podship_engine::{BlobShipmentHistoryStore, ShipmentHistoryStore};
use podship_infra::FileBlobStore;
use podship_inventory::{INVENTORY_BLOB_KEY, InventoryRepository};

fn pid(s: &str) -> ProductId {
    ProductId::parse(s).unwrap()
}

#[test]
fn shipment_history_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let customer = CustomerId::parse("42").unwrap();

    {
        let store = Arc::new(FileBlobStore::open(dir.path()).unwrap());
        let history = BlobShipmentHistoryStore::new(store);
        history.record(&customer, &[pid("A"), pid("B")]).unwrap();
        history.record(&customer, &[pid("B"), pid("C")]).unwrap();
    }

    let store = Arc::new(FileBlobStore::open(dir.path()).unwrap());
    let history = BlobShipmentHistoryStore::new(store).load(&customer).unwrap();
    assert_eq!(history.len(), 3);
    for p in ["A", "B", "C"] {
        assert!(history.contains(&pid(p)), "{p} missing");
    }
    assert!(dir.path().join("fulfillment-shipped%3A42.json").exists());
}

#[test]
fn inventory_persists_as_readable_json() {
    let dir = TempDir::new().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let repo = InventoryRepository::new(Arc::new(FileBlobStore::open(dir.path()).unwrap()));
    repo.update(|record| record.touch(&[pid("PX01")], now)).unwrap();

    let reopened = InventoryRepository::new(Arc::new(FileBlobStore::open(dir.path()).unwrap()));
    let loaded = reopened.load().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.value.last_shipped(&pid("PX01")), Some(now));

    let raw = std::fs::read_to_string(dir.path().join(format!("{INVENTORY_BLOB_KEY}.json"))).unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(envelope["version"], 1);
    let data: serde_json::Value = serde_json::from_str(envelope["data"].as_str().unwrap()).unwrap();
    assert_eq!(data["PX01"], now.timestamp());
}

#[test]
fn concurrent_inventory_writers_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileBlobStore::open(dir.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = InventoryRepository::new(store.clone()).with_max_attempts(50);
            std::thread::spawn(move || {
                let product = pid(&format!("P{i}"));
                repo.update(|record| record.touch([&product], now)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let record = InventoryRepository::new(store).load().unwrap().value;
    assert_eq!(record.len(), 8);
}
