//! JSON fixture file store
//!
//! Reads a [`StoreSnapshot`] from disk on every call so that edits to the
//! fixture are visible to the next batch step without a restart. Settings
//! imports are merged into a sibling JSON file.

use super::memory::{MemoryStore, StoreSnapshot};
use super::traits::{Page, RecordStore, SettingsStore};
use crate::domain::{Customer, HelpdeskError, JobFilters, Result, Ticket};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Record store backed by a JSON fixture file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    settings_path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store over `path`
    ///
    /// When `settings_path` is `None`, settings go to `<path stem>.settings.json`
    /// next to the fixture.
    pub fn new(path: impl Into<PathBuf>, settings_path: Option<PathBuf>) -> Self {
        let path = path.into();
        let settings_path = settings_path.unwrap_or_else(|| default_settings_path(&path));
        Self {
            path,
            settings_path,
        }
    }

    /// Path of the fixture file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path settings are written to
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    async fn load(&self) -> Result<MemoryStore> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            HelpdeskError::Io(format!(
                "Failed to read record file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let snapshot: StoreSnapshot = serde_json::from_str(&content).map_err(|e| {
            HelpdeskError::Serialization(format!(
                "Failed to parse record file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(MemoryStore::from_snapshot(snapshot))
    }
}

fn default_settings_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("helpdesk");
    path.with_file_name(format!("{stem}.settings.json"))
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn fetch_customers(&self, filters: &JobFilters, page: Page) -> Result<Vec<Customer>> {
        self.load().await?.fetch_customers(filters, page).await
    }

    async fn count_customers(&self, filters: &JobFilters) -> Result<u64> {
        self.load().await?.count_customers(filters).await
    }

    async fn fetch_tickets(&self, filters: &JobFilters, page: Page) -> Result<Vec<Ticket>> {
        self.load().await?.fetch_tickets(filters, page).await
    }

    async fn count_tickets(&self, filters: &JobFilters) -> Result<u64> {
        self.load().await?.count_tickets(filters).await
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn import_settings(&self, settings: &Map<String, Value>) -> Result<usize> {
        let mut current: Map<String, Value> = match tokio::fs::read_to_string(&self.settings_path)
            .await
        {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        for (key, value) in settings {
            current.insert(key.clone(), value.clone());
        }

        let content = serde_json::to_string_pretty(&Value::Object(current))?;
        tokio::fs::write(&self.settings_path, content).await?;

        tracing::debug!(
            path = %self.settings_path.display(),
            count = settings.len(),
            "Settings written"
        );

        Ok(settings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const FIXTURE: &str = r#"{
        "customers": [
            {"id": 2, "name": "Grace", "date_created": "2024-02-01T10:00:00Z"},
            {"id": 1, "name": "Ada", "date_created": "2024-01-01T10:00:00Z"}
        ],
        "tickets": []
    }"#;

    #[tokio::test]
    async fn test_reads_fixture_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let store = JsonFileStore::new(&path, None);
        let customers = store
            .fetch_customers(&JobFilters::default(), Page::new(0, 30))
            .await
            .unwrap();

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name.as_deref(), Some("Ada"));
        assert_eq!(store.count_tickets(&JobFilters::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_fixture_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"), None);
        let result = store.count_customers(&JobFilters::default()).await;
        assert!(matches!(result, Err(HelpdeskError::Io(_))));
    }

    #[tokio::test]
    async fn test_malformed_fixture_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path, None);
        let result = store.count_customers(&JobFilters::default()).await;
        assert!(matches!(result, Err(HelpdeskError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_settings_are_merged_into_sibling_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let store = JsonFileStore::new(&path, None);
        assert_eq!(store.settings_path(), dir.path().join("records.settings.json"));

        let first = json!({"ticket_prefix": "KB-", "per_page": 20});
        store
            .import_settings(first.as_object().unwrap())
            .await
            .unwrap();
        let second = json!({"per_page": 50});
        store
            .import_settings(second.as_object().unwrap())
            .await
            .unwrap();

        let saved: Value =
            serde_json::from_str(&std::fs::read_to_string(store.settings_path()).unwrap())
                .unwrap();
        assert_eq!(saved, json!({"ticket_prefix": "KB-", "per_page": 50}));
    }
}
