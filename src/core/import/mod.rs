//! Import jobs

pub mod settings;

pub use settings::{SettingsImporter, SETTINGS_IMPORTED};
