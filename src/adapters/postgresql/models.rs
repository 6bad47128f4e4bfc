//! PostgreSQL row models
//!
//! Column lists and row conversions for the `kbs_customers` and `kbs_tickets`
//! tables. Conversions are strict about ids and status but leave every
//! nullable column as `None` for the column mapper to render.

use crate::domain::{Customer, CustomerId, HelpdeskError, Result, Ticket, TicketId, TicketStatus};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// Columns selected for a customer row, in the order [`customer_from_row`] reads them
pub const CUSTOMER_COLUMNS: &str = "id, name, primary_email, additional_emails, company, \
     phone, website, ticket_count, date_created";

/// Columns selected for a ticket row, in the order [`ticket_from_row`] reads them
pub const TICKET_COLUMNS: &str = "id, number, title, status, date_created, date_modified, \
     customer_name, customer_email, company, agent, categories, source";

fn row_error(table: &str, e: impl std::fmt::Display) -> HelpdeskError {
    HelpdeskError::Database(format!("Invalid {} row: {}", table, e))
}

fn positive_id(table: &str, id: i64) -> Result<u64> {
    u64::try_from(id).map_err(|_| row_error(table, format!("negative id {}", id)))
}

/// Convert a `kbs_customers` row into a [`Customer`]
///
/// # Errors
///
/// Returns an error if a column has an unexpected type or the id is invalid.
pub fn customer_from_row(row: &Row) -> Result<Customer> {
    let table = "kbs_customers";
    let get_err = |e: tokio_postgres::Error| row_error(table, e);

    let id: i64 = row.try_get("id").map_err(get_err)?;
    let id = CustomerId::new(positive_id(table, id)?).map_err(|e| row_error(table, e))?;
    let ticket_count: i64 = row.try_get("ticket_count").map_err(get_err)?;
    let additional_emails: Option<Vec<String>> =
        row.try_get("additional_emails").map_err(get_err)?;

    Ok(Customer {
        id,
        name: row.try_get("name").map_err(get_err)?,
        primary_email: row.try_get("primary_email").map_err(get_err)?,
        additional_emails: additional_emails.unwrap_or_default(),
        company: row.try_get("company").map_err(get_err)?,
        phone: row.try_get("phone").map_err(get_err)?,
        website: row.try_get("website").map_err(get_err)?,
        ticket_count: u64::try_from(ticket_count).unwrap_or(0),
        date_created: row.try_get::<_, DateTime<Utc>>("date_created").map_err(get_err)?,
    })
}

/// Convert a `kbs_tickets` row into a [`Ticket`]
///
/// # Errors
///
/// Returns an error if a column has an unexpected type, the id is invalid or
/// the status is not a known slug.
pub fn ticket_from_row(row: &Row) -> Result<Ticket> {
    let table = "kbs_tickets";
    let get_err = |e: tokio_postgres::Error| row_error(table, e);

    let id: i64 = row.try_get("id").map_err(get_err)?;
    let id = TicketId::new(positive_id(table, id)?).map_err(|e| row_error(table, e))?;
    let status: String = row.try_get("status").map_err(get_err)?;
    let status: TicketStatus = status.parse().map_err(|e| row_error(table, e))?;
    let categories: Option<Vec<String>> = row.try_get("categories").map_err(get_err)?;

    Ok(Ticket {
        id,
        number: row.try_get("number").map_err(get_err)?,
        title: row.try_get("title").map_err(get_err)?,
        status,
        date_created: row.try_get::<_, DateTime<Utc>>("date_created").map_err(get_err)?,
        date_modified: row.try_get("date_modified").map_err(get_err)?,
        customer_name: row.try_get("customer_name").map_err(get_err)?,
        customer_email: row.try_get("customer_email").map_err(get_err)?,
        company: row.try_get("company").map_err(get_err)?,
        agent: row.try_get("agent").map_err(get_err)?,
        categories: categories.unwrap_or_default(),
        source: row.try_get("source").map_err(get_err)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_id_rejects_negative() {
        assert_eq!(positive_id("kbs_tickets", 7).unwrap(), 7);
        assert!(matches!(
            positive_id("kbs_tickets", -1),
            Err(HelpdeskError::Database(_))
        ));
    }

    #[test]
    fn test_column_lists_cover_date_created() {
        assert!(CUSTOMER_COLUMNS.contains("date_created"));
        assert!(TICKET_COLUMNS.contains("date_created"));
        assert!(TICKET_COLUMNS.ends_with("source"));
    }
}
