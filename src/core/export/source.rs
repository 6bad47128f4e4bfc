//! Record source adapters
//!
//! Turn a step number into a fixed-size page of records from the store, and
//! count the full result set for progress estimation. Store failures surface
//! as [`BatchError::SourceUnavailable`].

use crate::adapters::store::{Page, RecordStore};
use crate::domain::{BatchError, HelpdeskError, JobFilters, Record};
use async_trait::async_trait;
use std::sync::Arc;

/// Records fetched per step
pub const PAGE_SIZE: u64 = 30;

/// Page window for a 1-based step: offset `PAGE_SIZE * (step - 1)`
///
/// # Errors
///
/// Returns `InvalidStep` for step 0.
pub fn page_for_step(step: u32) -> Result<Page, BatchError> {
    if step == 0 {
        return Err(BatchError::InvalidStep(
            "step must be 1 or greater".to_string(),
        ));
    }
    let offset = PAGE_SIZE.saturating_mul(u64::from(step - 1));
    Ok(Page::new(offset, PAGE_SIZE))
}

fn unavailable(err: HelpdeskError) -> BatchError {
    tracing::warn!(error = %err, "Record store query failed");
    BatchError::SourceUnavailable(err.to_string())
}

/// Paged, read-only access to the records of one job type
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Records for `step`, in ascending creation order
    async fn fetch_page(&self, step: u32, filters: &JobFilters) -> Result<Vec<Record>, BatchError>;

    /// Number of records matching `filters`
    async fn total(&self, filters: &JobFilters) -> Result<u64, BatchError>;
}

/// Customers from a record store
pub struct CustomerSource {
    store: Arc<dyn RecordStore>,
}

impl CustomerSource {
    /// Creates a source over `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordSource for CustomerSource {
    async fn fetch_page(&self, step: u32, filters: &JobFilters) -> Result<Vec<Record>, BatchError> {
        let page = page_for_step(step)?;
        let customers = self
            .store
            .fetch_customers(filters, page)
            .await
            .map_err(unavailable)?;
        Ok(customers.into_iter().map(Record::from).collect())
    }

    async fn total(&self, filters: &JobFilters) -> Result<u64, BatchError> {
        self.store
            .count_customers(filters)
            .await
            .map_err(unavailable)
    }
}

/// Tickets from a record store
pub struct TicketSource {
    store: Arc<dyn RecordStore>,
}

impl TicketSource {
    /// Creates a source over `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordSource for TicketSource {
    async fn fetch_page(&self, step: u32, filters: &JobFilters) -> Result<Vec<Record>, BatchError> {
        let page = page_for_step(step)?;
        let tickets = self
            .store
            .fetch_tickets(filters, page)
            .await
            .map_err(unavailable)?;
        Ok(tickets.into_iter().map(Record::from).collect())
    }

    async fn total(&self, filters: &JobFilters) -> Result<u64, BatchError> {
        self.store.count_tickets(filters).await.map_err(unavailable)
    }
}
