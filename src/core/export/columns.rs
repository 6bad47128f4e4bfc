//! Column mapping
//!
//! A [`ColumnMapper`] fixes the ordered output columns for one job type and
//! turns a single [`Record`] into a [`Row`] of display-ready strings. Mapping
//! is pure: no I/O and no mutation of the record.

use crate::domain::{BatchError, Customer, Record, Ticket};
use chrono::{DateTime, Utc};

/// Agent shown for a ticket nobody is assigned to
pub const UNASSIGNED_AGENT: &str = "Unassigned";

/// Customer shown for a ticket with no customer attached
pub const GUEST_CUSTOMER: &str = "Guest";

/// Category shown for a ticket with no categories
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Date format used when none is configured (e.g. "March 4, 2024")
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Ordered column key to display label mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    columns: Vec<(&'static str, &'static str)>,
}

impl ColumnSpec {
    /// Creates a spec from `(key, label)` pairs in output order
    pub fn new(columns: Vec<(&'static str, &'static str)>) -> Self {
        Self { columns }
    }

    /// Column keys in order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(key, _)| *key)
    }

    /// Column labels in order, used for the header row
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(_, label)| *label)
    }

    /// Label for a key
    pub fn label(&self, key: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, label)| *label)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One output row: column key to formatted value, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(&'static str, String)>,
}

impl Row {
    /// Value of a column
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, value)| value.as_str())
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Fills a row in column order, checking every declared column is set once
struct RowBuilder<'a> {
    spec: &'a ColumnSpec,
    cells: Vec<(&'static str, String)>,
}

impl<'a> RowBuilder<'a> {
    fn new(spec: &'a ColumnSpec) -> Self {
        Self {
            spec,
            cells: Vec::with_capacity(spec.len()),
        }
    }

    fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.cells.push((key, value.into()));
        self
    }

    fn build(self) -> Result<Row, BatchError> {
        let matches = self.cells.len() == self.spec.len()
            && self.spec.keys().zip(&self.cells).all(|(k, (c, _))| k == *c);
        if !matches {
            return Err(BatchError::Mapping(
                "row does not match the declared columns".to_string(),
            ));
        }
        Ok(Row { cells: self.cells })
    }
}

/// Projects records of one kind into output rows
pub trait ColumnMapper: Send + Sync {
    /// The fixed columns for this job type
    fn columns(&self) -> &ColumnSpec;

    /// Map one record to a row
    ///
    /// # Errors
    ///
    /// Returns `Mapping` if the record is of the wrong kind.
    fn map(&self, record: &Record) -> Result<Row, BatchError>;
}

fn text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    date.format(format).to_string()
}

/// Customer export columns
#[derive(Debug, Clone)]
pub struct CustomerColumns {
    spec: ColumnSpec,
    date_format: String,
}

impl CustomerColumns {
    /// Creates the mapper with the given strftime date format
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            spec: ColumnSpec::new(vec![
                ("id", "ID"),
                ("name", "Name"),
                ("email", "Email"),
                ("additional_emails", "Additional Emails"),
                ("company", "Company"),
                ("phone", "Phone"),
                ("website", "Website"),
                ("tickets", "Tickets"),
                ("date_created", "Date Created"),
            ]),
            date_format: date_format.into(),
        }
    }

    fn map_customer(&self, customer: &Customer) -> Result<Row, BatchError> {
        RowBuilder::new(&self.spec)
            .set("id", customer.id.to_string())
            .set("name", text(customer.name.as_deref()))
            .set("email", text(customer.primary_email.as_deref()))
            .set("additional_emails", customer.additional_emails.join(", "))
            .set("company", text(customer.company.as_deref()))
            .set("phone", text(customer.phone.as_deref()))
            .set("website", text(customer.website.as_deref()))
            .set("tickets", customer.ticket_count.to_string())
            .set(
                "date_created",
                format_date(&customer.date_created, &self.date_format),
            )
            .build()
    }
}

impl Default for CustomerColumns {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl ColumnMapper for CustomerColumns {
    fn columns(&self) -> &ColumnSpec {
        &self.spec
    }

    fn map(&self, record: &Record) -> Result<Row, BatchError> {
        match record {
            Record::Customer(customer) => self.map_customer(customer),
            other => Err(BatchError::Mapping(format!(
                "customer export cannot map a {} record",
                other.kind()
            ))),
        }
    }
}

/// Ticket export columns
#[derive(Debug, Clone)]
pub struct TicketColumns {
    spec: ColumnSpec,
    date_format: String,
}

impl TicketColumns {
    /// Creates the mapper with the given strftime date format
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            spec: ColumnSpec::new(vec![
                ("id", "ID"),
                ("number", "Number"),
                ("date", "Date"),
                ("modified", "Last Modified"),
                ("status", "Status"),
                ("title", "Title"),
                ("customer", "Customer"),
                ("email", "Email"),
                ("company", "Company"),
                ("agent", "Agent"),
                ("category", "Category"),
                ("source", "Source"),
            ]),
            date_format: date_format.into(),
        }
    }

    fn map_ticket(&self, ticket: &Ticket) -> Result<Row, BatchError> {
        let number = text_or(ticket.number.as_deref(), &ticket.id.to_string());
        let categories: Vec<&str> = ticket
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        let category = if categories.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            categories.join(", ")
        };
        let modified = ticket
            .date_modified
            .map(|d| format_date(&d, &self.date_format))
            .unwrap_or_default();

        RowBuilder::new(&self.spec)
            .set("id", ticket.id.to_string())
            .set("number", number)
            .set("date", format_date(&ticket.date_created, &self.date_format))
            .set("modified", modified)
            .set("status", ticket.status.label())
            .set("title", text(ticket.title.as_deref()))
            .set(
                "customer",
                text_or(ticket.customer_name.as_deref(), GUEST_CUSTOMER),
            )
            .set("email", text(ticket.customer_email.as_deref()))
            .set("company", text(ticket.company.as_deref()))
            .set("agent", text_or(ticket.agent.as_deref(), UNASSIGNED_AGENT))
            .set("category", category)
            .set("source", text(ticket.source.as_deref()))
            .build()
    }
}

impl Default for TicketColumns {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl ColumnMapper for TicketColumns {
    fn columns(&self) -> &ColumnSpec {
        &self.spec
    }

    fn map(&self, record: &Record) -> Result<Row, BatchError> {
        match record {
            Record::Ticket(ticket) => self.map_ticket(ticket),
            other => Err(BatchError::Mapping(format!(
                "ticket export cannot map a {} record",
                other.kind()
            ))),
        }
    }
}
