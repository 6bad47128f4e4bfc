//! Configuration management.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HELPDESK_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ServerConfig`] - Bind address and public URL for download links
//! - [`ExportConfig`] - Artifact directory and date format
//! - [`StoreConfig`] - Record store backend
//! - [`PostgreSQLConfig`] - PostgreSQL connection and pool settings
//! - [`SecurityConfig`] - Token signing secret and lifetimes
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! public_url = "https://helpdesk.example.com"
//!
//! [export]
//! artifact_dir = "/var/lib/helpdesk-export"
//! date_format = "%B %-d, %Y"
//!
//! [store]
//! backend = "postgresql"
//!
//! [postgresql]
//! connection_string = "${HELPDESK_PG_URL}"
//!
//! [security]
//! token_secret = "${HELPDESK_TOKEN_SECRET}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, HelpdeskConfig, LoggingConfig, PostgreSQLConfig,
    SecurityConfig, ServerConfig, StoreBackend, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
