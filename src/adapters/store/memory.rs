//! In-memory record store
//!
//! Holds a snapshot of customers and tickets in process. Used directly by
//! tests and demos, and as the query engine behind the JSON fixture store.

use super::traits::{Page, RecordStore, SettingsStore};
use crate::domain::{Customer, HelpdeskError, JobFilters, Result, Ticket};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Serializable set of records, the on-disk shape of the JSON fixture file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Customer records
    #[serde(default)]
    pub customers: Vec<Customer>,

    /// Ticket records
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

/// In-memory record and settings store
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<Vec<Customer>>,
    tickets: RwLock<Vec<Ticket>>,
    settings: RwLock<Map<String, Value>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        if let Ok(mut customers) = store.customers.write() {
            *customers = snapshot.customers;
        }
        if let Ok(mut tickets) = store.tickets.write() {
            *tickets = snapshot.tickets;
        }
        store
    }

    /// Adds a customer
    pub fn insert_customer(&self, customer: Customer) -> Result<()> {
        self.customers
            .write()
            .map_err(|_| lock_poisoned("customers"))?
            .push(customer);
        Ok(())
    }

    /// Adds a ticket
    pub fn insert_ticket(&self, ticket: Ticket) -> Result<()> {
        self.tickets
            .write()
            .map_err(|_| lock_poisoned("tickets"))?
            .push(ticket);
        Ok(())
    }

    /// Simulates the store going away; every query fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current settings
    pub fn settings(&self) -> Result<Map<String, Value>> {
        Ok(self
            .settings
            .read()
            .map_err(|_| lock_poisoned("settings"))?
            .clone())
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(HelpdeskError::Database(
                "memory store is marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn matching_customers(&self, filters: &JobFilters) -> Result<Vec<Customer>> {
        self.ensure_available()?;
        let customers = self
            .customers
            .read()
            .map_err(|_| lock_poisoned("customers"))?;

        let mut matched: Vec<Customer> = customers
            .iter()
            .filter(|c| filters.contains(&c.date_created))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
        Ok(matched)
    }

    fn matching_tickets(&self, filters: &JobFilters) -> Result<Vec<Ticket>> {
        self.ensure_available()?;
        let tickets = self.tickets.read().map_err(|_| lock_poisoned("tickets"))?;

        let mut matched: Vec<Ticket> = tickets
            .iter()
            .filter(|t| filters.contains(&t.date_created))
            .filter(|t| filters.status.map_or(true, |status| t.status == status))
            .filter(|t| {
                filters.category.as_deref().map_or(true, |category| {
                    t.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
                })
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
        Ok(matched)
    }
}

fn lock_poisoned(what: &str) -> HelpdeskError {
    HelpdeskError::Database(format!("memory store {what} lock poisoned"))
}

fn paginate<T>(records: Vec<T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    records.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_customers(&self, filters: &JobFilters, page: Page) -> Result<Vec<Customer>> {
        Ok(paginate(self.matching_customers(filters)?, page))
    }

    async fn count_customers(&self, filters: &JobFilters) -> Result<u64> {
        Ok(self.matching_customers(filters)?.len() as u64)
    }

    async fn fetch_tickets(&self, filters: &JobFilters, page: Page) -> Result<Vec<Ticket>> {
        Ok(paginate(self.matching_tickets(filters)?, page))
    }

    async fn count_tickets(&self, filters: &JobFilters) -> Result<u64> {
        Ok(self.matching_tickets(filters)?.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn import_settings(&self, settings: &Map<String, Value>) -> Result<usize> {
        self.ensure_available()?;
        let mut current = self
            .settings
            .write()
            .map_err(|_| lock_poisoned("settings"))?;
        for (key, value) in settings {
            current.insert(key.clone(), value.clone());
        }
        Ok(settings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomerId, TicketId, TicketStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn ticket(id: u64, day: u32, status: TicketStatus, category: &str) -> Ticket {
        Ticket::builder()
            .id(TicketId::new(id).unwrap())
            .status(status)
            .category(category)
            .date_created(Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_customers_sorted_by_creation_then_id() {
        let store = MemoryStore::new();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (id, offset) in [(3, 2), (1, 1), (2, 1)] {
            store
                .insert_customer(
                    Customer::builder()
                        .id(CustomerId::new(id).unwrap())
                        .date_created(base + Duration::days(offset))
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }

        let page = store
            .fetch_customers(&JobFilters::default(), Page::new(0, 30))
            .await
            .unwrap();
        let ids: Vec<u64> = page.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_ticket_filters() {
        let store = MemoryStore::new();
        store.insert_ticket(ticket(1, 2, TicketStatus::Open, "Billing")).unwrap();
        store.insert_ticket(ticket(2, 3, TicketStatus::Closed, "Billing")).unwrap();
        store.insert_ticket(ticket(3, 4, TicketStatus::Open, "Sales")).unwrap();

        let filters = JobFilters {
            status: Some(TicketStatus::Open),
            category: Some("billing".to_string()),
            ..Default::default()
        };

        assert_eq!(store.count_tickets(&filters).await.unwrap(), 1);
        let page = store.fetch_tickets(&filters, Page::new(0, 30)).await.unwrap();
        assert_eq!(page[0].id.get(), 1);
    }

    #[tokio::test]
    async fn test_pagination_past_end_is_empty() {
        let store = MemoryStore::new();
        store.insert_ticket(ticket(1, 2, TicketStatus::Open, "Billing")).unwrap();

        let page = store
            .fetch_tickets(&JobFilters::default(), Page::new(30, 30))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(store.count_customers(&JobFilters::default()).await.is_err());
    }
}
