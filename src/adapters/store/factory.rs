//! Record store factory
//!
//! Builds the configured backend once and hands it out as both the record
//! store and the settings store.

use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::store::json_file::JsonFileStore;
use crate::adapters::store::memory::MemoryStore;
use crate::adapters::store::traits::{RecordStore, SettingsStore};
use crate::config::schema::{HelpdeskConfig, StoreBackend};
use crate::domain::{HelpdeskError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// The record and settings stores behind one backend
#[derive(Clone)]
pub struct Stores {
    /// Read access to customers and tickets
    pub records: Arc<dyn RecordStore>,

    /// Write access to settings
    pub settings: Arc<dyn SettingsStore>,
}

impl Stores {
    /// Wraps a single backend that implements both traits
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: RecordStore + SettingsStore + 'static,
    {
        Self {
            records: backend.clone(),
            settings: backend,
        }
    }
}

/// Create the stores selected by `store.backend`
///
/// No connection is opened here; the PostgreSQL pool connects lazily.
///
/// # Errors
///
/// Returns an error if the backend's section is missing or invalid
pub fn create_stores(config: &HelpdeskConfig) -> Result<Stores> {
    match config.store.backend {
        StoreBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                HelpdeskError::Configuration(
                    "postgresql configuration is required when store.backend = 'postgresql'"
                        .to_string(),
                )
            })?;

            let client = PostgreSQLClient::new(pg_config.clone())?;
            tracing::info!(
                connection = %client.connection_string_safe(),
                "Creating PostgreSQL record store"
            );
            Ok(Stores::from_backend(Arc::new(PostgreSQLAdapter::new(client))))
        }
        StoreBackend::Json => {
            let path = config.store.json_path.as_deref().ok_or_else(|| {
                HelpdeskError::Configuration(
                    "store.json_path is required when store.backend = 'json'".to_string(),
                )
            })?;
            let settings_path = config.store.settings_path.as_ref().map(PathBuf::from);

            tracing::info!(path = %path, "Creating JSON record store");
            Ok(Stores::from_backend(Arc::new(JsonFileStore::new(
                path,
                settings_path,
            ))))
        }
        StoreBackend::Memory => {
            tracing::info!("Creating in-memory record store");
            Ok(Stores::from_backend(Arc::new(MemoryStore::new())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{SecurityConfig, StoreConfig};
    use crate::config::secret_string;

    fn config(backend: StoreBackend) -> HelpdeskConfig {
        HelpdeskConfig {
            application: Default::default(),
            server: Default::default(),
            export: Default::default(),
            store: StoreConfig {
                backend,
                json_path: None,
                settings_path: None,
            },
            postgresql: None,
            security: SecurityConfig {
                token_secret: secret_string("0123456789abcdef0123456789abcdef".to_string()),
                token_ttl_seconds: 3600,
                download_ttl_seconds: 600,
            },
            logging: Default::default(),
        }
    }

    #[test]
    fn test_memory_backend() {
        let stores = create_stores(&config(StoreBackend::Memory)).unwrap();
        assert_eq!(stores.records.backend_name(), "memory");
    }

    #[test]
    fn test_json_backend_requires_path() {
        assert!(create_stores(&config(StoreBackend::Json)).is_err());

        let mut cfg = config(StoreBackend::Json);
        cfg.store.json_path = Some("records.json".to_string());
        let stores = create_stores(&cfg).unwrap();
        assert_eq!(stores.records.backend_name(), "json");
    }

    #[test]
    fn test_postgresql_backend_requires_section() {
        assert!(matches!(
            create_stores(&config(StoreBackend::PostgreSQL)),
            Err(HelpdeskError::Configuration(_))
        ));
    }
}
