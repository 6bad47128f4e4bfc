//! Record store abstraction
//!
//! Trait-based access to help-desk records with three backends:
//!
//! - [`PostgreSQLAdapter`](crate::adapters::postgresql::PostgreSQLAdapter) for production
//! - [`JsonFileStore`] for fixture files
//! - [`MemoryStore`] for tests and demos

pub mod factory;
pub mod json_file;
pub mod memory;
pub mod traits;

pub use factory::{create_stores, Stores};
pub use json_file::JsonFileStore;
pub use memory::{MemoryStore, StoreSnapshot};
pub use traits::{Page, RecordStore, SettingsStore};
