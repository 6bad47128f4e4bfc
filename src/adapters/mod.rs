//! Record store integrations.
//!
//! - [`store`] - Store traits, the in-memory and JSON fixture backends, and
//!   the backend factory
//! - [`postgresql`] - PostgreSQL backend
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate the record store from
//! the batch pipeline. The pipeline only sees [`store::RecordStore`] and
//! [`store::SettingsStore`], so tests run against [`store::MemoryStore`].
//!
//! ```rust
//! use helpdesk_export::adapters::store::{MemoryStore, Page, RecordStore};
//! use helpdesk_export::domain::JobFilters;
//!
//! # async fn example() -> helpdesk_export::domain::Result<()> {
//! let store = MemoryStore::new();
//! let page = store.fetch_tickets(&JobFilters::default(), Page::new(0, 30)).await?;
//! assert!(page.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod postgresql;
pub mod store;
