//! Billing plans read from a JSON file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use podship_engine::BillingPlanDirectory;
use podship_plans::PlanFields;

#[derive(Debug, Error)]
pub enum PlanFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate plan {product_id}/{billing_plan_id}")]
    Duplicate {
        product_id: String,
        billing_plan_id: String,
    },
}

/// One entry of the plans file.
///
/// ```json
/// { "product_id": "7", "billing_plan_id": "1", "title": "DVD of the Month",
///   "fields": { "products": "A,B:C,D", "always_ship": false } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanRecord {
    pub product_id: String,
    #[serde(default)]
    pub billing_plan_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: PlanFields,
}

/// Live billing plans, keyed by product and plan id.
#[derive(Debug, Clone, Default)]
pub struct FilePlanDirectory {
    plans: HashMap<(String, String), PlanFields>,
    titles: HashMap<String, String>,
}

impl FilePlanDirectory {
    pub fn load(path: &Path) -> Result<Self, PlanFileError> {
        let raw = fs::read_to_string(path).map_err(|source| PlanFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<PlanRecord> = serde_json::from_str(&raw).map_err(|source| PlanFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_records(records)?;
        tracing::debug!(path = %path.display(), plans = directory.len(), "billing plans loaded");
        Ok(directory)
    }

    pub fn from_records(records: impl IntoIterator<Item = PlanRecord>) -> Result<Self, PlanFileError> {
        let mut directory = Self::default();
        for record in records {
            let key = (record.product_id.clone(), record.billing_plan_id.clone());
            if directory.plans.contains_key(&key) {
                return Err(PlanFileError::Duplicate {
                    product_id: record.product_id,
                    billing_plan_id: record.billing_plan_id,
                });
            }
            if let Some(title) = record.title.filter(|t| !t.trim().is_empty()) {
                directory.titles.insert(record.product_id.clone(), title);
            }
            directory.plans.insert(key, record.fields);
        }
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl BillingPlanDirectory for FilePlanDirectory {
    fn plan_fields(&self, product_id: &str, billing_plan_id: &str) -> Option<PlanFields> {
        self.plans
            .get(&(product_id.to_string(), billing_plan_id.to_string()))
            .cloned()
    }

    fn product_title(&self, product_id: &str) -> Option<String> {
        self.titles.get(product_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PLANS: &str = r#"[
        { "product_id": "7", "billing_plan_id": "1", "title": "DVD of the Month",
          "fields": { "products": "A,B:C,D" } },
        { "product_id": "8", "billing_plan_id": "2",
          "fields": { "products": "X", "always_ship": true, "always_fresh": true } },
        { "product_id": "9" }
    ]"#;

    fn plans_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_plans_and_titles() {
        let file = plans_file(PLANS);
        let directory = FilePlanDirectory::load(file.path()).unwrap();

        assert_eq!(directory.len(), 3);
        assert_eq!(
            directory.plan_fields("7", "1"),
            Some(PlanFields::with_products("A,B:C,D"))
        );
        assert_eq!(
            directory.plan_fields("8", "2"),
            Some(PlanFields::with_products("X").always_ship(true).always_fresh(true))
        );
        assert_eq!(directory.plan_fields("9", ""), Some(PlanFields::default()));
        assert_eq!(directory.plan_fields("7", "2"), None);

        assert_eq!(directory.product_title("7").as_deref(), Some("DVD of the Month"));
        assert_eq!(directory.product_title("8"), None);
    }

    #[test]
    fn duplicate_plan_is_rejected() {
        let file = plans_file(r#"[{ "product_id": "7", "billing_plan_id": "1" }, { "product_id": "7", "billing_plan_id": "1" }]"#);
        assert!(matches!(
            FilePlanDirectory::load(file.path()),
            Err(PlanFileError::Duplicate { .. })
        ));
    }

    #[test]
    fn missing_and_malformed_files_are_reported() {
        assert!(matches!(
            FilePlanDirectory::load(Path::new("/nonexistent/plans.json")),
            Err(PlanFileError::Io { .. })
        ));
        let file = plans_file("{ not json");
        assert!(matches!(FilePlanDirectory::load(file.path()), Err(PlanFileError::Parse { .. })));
    }
}
