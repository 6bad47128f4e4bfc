//! Settings import
//!
//! The only void job type: one step that stores a JSON object of plugin
//! settings and produces no artifact.

use crate::adapters::store::SettingsStore;
use crate::domain::BatchError;
use serde_json::Value;
use std::sync::Arc;

/// Message returned after a successful import
pub const SETTINGS_IMPORTED: &str = "Settings successfully imported.";

/// Upper bound on the number of keys accepted in one import
pub const MAX_SETTINGS: usize = 500;

/// Validates and stores imported settings
pub struct SettingsImporter {
    store: Arc<dyn SettingsStore>,
}

impl SettingsImporter {
    /// Creates an importer writing to `store`
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Import `payload`
    ///
    /// Accepts either a JSON object or a string containing one, since the
    /// admin UI uploads the settings file as text.
    ///
    /// # Returns
    ///
    /// The number of settings stored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` if the payload is missing, not an object,
    /// empty, too large or has a blank key, and `DestinationNotWritable` if
    /// the store rejects the write.
    pub async fn import(&self, payload: Option<&Value>) -> Result<usize, BatchError> {
        let parsed;
        let value = match payload {
            None | Some(Value::Null) => {
                return Err(BatchError::InvalidSettings(
                    "no settings were provided".to_string(),
                ))
            }
            Some(Value::String(text)) => {
                parsed = serde_json::from_str::<Value>(text)
                    .map_err(|e| BatchError::InvalidSettings(e.to_string()))?;
                &parsed
            }
            Some(value) => value,
        };

        let settings = value.as_object().ok_or_else(|| {
            BatchError::InvalidSettings("settings must be a JSON object".to_string())
        })?;

        if settings.is_empty() {
            return Err(BatchError::InvalidSettings(
                "settings file is empty".to_string(),
            ));
        }
        if settings.len() > MAX_SETTINGS {
            return Err(BatchError::InvalidSettings(format!(
                "too many settings ({}, limit {})",
                settings.len(),
                MAX_SETTINGS
            )));
        }
        if settings.keys().any(|key| key.trim().is_empty()) {
            return Err(BatchError::InvalidSettings(
                "setting names cannot be blank".to_string(),
            ));
        }

        let count = self
            .store
            .import_settings(settings)
            .await
            .map_err(|e| BatchError::DestinationNotWritable(e.to_string()))?;

        tracing::info!(count = count, "Settings imported");
        Ok(count)
    }
}
