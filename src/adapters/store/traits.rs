//! Record store abstraction traits
//!
//! These traits are the seam between the batch pipeline and whatever owns the
//! help-desk records. Implementations must be read-only for record queries and
//! return records in ascending creation order, ties broken by id.

use crate::domain::{Customer, JobFilters, Result, Ticket};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A window into an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Number of records to skip
    pub offset: u64,

    /// Maximum number of records to return
    pub limit: u64,
}

impl Page {
    /// Creates a page window
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// Read access to customer and ticket records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one page of customers matching the filters
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    async fn fetch_customers(&self, filters: &JobFilters, page: Page) -> Result<Vec<Customer>>;

    /// Count all customers matching the filters
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    async fn count_customers(&self, filters: &JobFilters) -> Result<u64>;

    /// Fetch one page of tickets matching the filters
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    async fn fetch_tickets(&self, filters: &JobFilters, page: Page) -> Result<Vec<Ticket>>;

    /// Count all tickets matching the filters
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    async fn count_tickets(&self, filters: &JobFilters) -> Result<u64>;

    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Write access to plugin settings, used by the settings import job
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store every key of `settings`, replacing existing values
    ///
    /// # Returns
    ///
    /// The number of settings written.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be persisted.
    async fn import_settings(&self, settings: &Map<String, Value>) -> Result<usize>;
}
