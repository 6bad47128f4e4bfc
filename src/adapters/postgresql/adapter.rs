//! PostgreSQL adapter implementing the store traits
//!
//! Filters are bound as nullable parameters so each query has one fixed SQL
//! text regardless of which filters the job carries.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    customer_from_row, ticket_from_row, CUSTOMER_COLUMNS, TICKET_COLUMNS,
};
use crate::adapters::store::{Page, RecordStore, SettingsStore};
use crate::domain::{Customer, HelpdeskError, JobFilters, Result, Ticket};
use async_trait::async_trait;
use serde_json::{Map, Value};

const CUSTOMER_FILTER: &str = "($1::timestamptz IS NULL OR date_created >= $1) \
     AND ($2::timestamptz IS NULL OR date_created < $2)";

const TICKET_FILTER: &str = "($1::timestamptz IS NULL OR date_created >= $1) \
     AND ($2::timestamptz IS NULL OR date_created < $2) \
     AND ($3::text IS NULL OR status = $3) \
     AND ($4::text IS NULL OR EXISTS ( \
         SELECT 1 FROM unnest(categories) AS c WHERE lower(c) = lower($4)))";

/// PostgreSQL implementation of the record and settings stores
pub struct PostgreSQLAdapter {
    client: PostgreSQLClient,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self { client }
    }
}

fn to_i64(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| HelpdeskError::Validation(format!("{} {} is out of range", what, value)))
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl RecordStore for PostgreSQLAdapter {
    async fn fetch_customers(&self, filters: &JobFilters, page: Page) -> Result<Vec<Customer>> {
        let query = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM kbs_customers WHERE {CUSTOMER_FILTER} \
             ORDER BY date_created ASC, id ASC LIMIT $3 OFFSET $4"
        );
        let limit = to_i64(page.limit, "limit")?;
        let offset = to_i64(page.offset, "offset")?;

        let rows = self
            .client
            .query(
                &query,
                &[
                    &filters.created_after(),
                    &filters.created_before(),
                    &limit,
                    &offset,
                ],
            )
            .await?;

        tracing::debug!(
            offset = page.offset,
            returned = rows.len(),
            "Fetched customer page from PostgreSQL"
        );

        rows.iter().map(customer_from_row).collect()
    }

    async fn count_customers(&self, filters: &JobFilters) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM kbs_customers WHERE {CUSTOMER_FILTER}");
        let row = self
            .client
            .query_one(&query, &[&filters.created_after(), &filters.created_before()])
            .await?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| HelpdeskError::Database(format!("Invalid count: {}", e)))?;
        Ok(to_count(count))
    }

    async fn fetch_tickets(&self, filters: &JobFilters, page: Page) -> Result<Vec<Ticket>> {
        let query = format!(
            "SELECT {TICKET_COLUMNS} FROM kbs_tickets WHERE {TICKET_FILTER} \
             ORDER BY date_created ASC, id ASC LIMIT $5 OFFSET $6"
        );
        let status = filters.status.map(|s| s.as_str());
        let category = filters.category.as_deref();
        let limit = to_i64(page.limit, "limit")?;
        let offset = to_i64(page.offset, "offset")?;

        let rows = self
            .client
            .query(
                &query,
                &[
                    &filters.created_after(),
                    &filters.created_before(),
                    &status,
                    &category,
                    &limit,
                    &offset,
                ],
            )
            .await?;

        tracing::debug!(
            offset = page.offset,
            returned = rows.len(),
            "Fetched ticket page from PostgreSQL"
        );

        rows.iter().map(ticket_from_row).collect()
    }

    async fn count_tickets(&self, filters: &JobFilters) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM kbs_tickets WHERE {TICKET_FILTER}");
        let status = filters.status.map(|s| s.as_str());
        let category = filters.category.as_deref();

        let row = self
            .client
            .query_one(
                &query,
                &[
                    &filters.created_after(),
                    &filters.created_before(),
                    &status,
                    &category,
                ],
            )
            .await?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| HelpdeskError::Database(format!("Invalid count: {}", e)))?;
        Ok(to_count(count))
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}

#[async_trait]
impl SettingsStore for PostgreSQLAdapter {
    async fn import_settings(&self, settings: &Map<String, Value>) -> Result<usize> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| HelpdeskError::Database(format!("Failed to begin transaction: {}", e)))?;

        for (key, value) in settings {
            tx.execute(
                "INSERT INTO kbs_settings (key, value, updated_at) VALUES ($1, $2, NOW()) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
                &[key, value],
            )
            .await
            .map_err(|e| {
                HelpdeskError::Database(format!("Failed to store setting '{}': {}", key, e))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| HelpdeskError::Database(format!("Failed to commit settings: {}", e)))?;

        tracing::info!(count = settings.len(), "Settings stored in PostgreSQL");
        Ok(settings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_i64_range() {
        assert_eq!(to_i64(30, "limit").unwrap(), 30);
        assert!(to_i64(u64::MAX, "offset").is_err());
    }

    #[test]
    fn test_to_count_clamps_negative() {
        assert_eq!(to_count(-5), 0);
        assert_eq!(to_count(65), 65);
    }

    #[test]
    fn test_ticket_filter_binds_four_parameters() {
        assert!(TICKET_FILTER.contains("$4"));
        assert!(!TICKET_FILTER.contains("$5"));
        assert!(!CUSTOMER_FILTER.contains("$3"));
    }
}
