//! Customer domain model
//!
//! A customer as owned by the record store. The export pipeline only reads it.

use super::ids::CustomerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A help-desk customer record
///
/// Optional fields reflect what the store may leave NULL; the column mapper
/// decides how each missing value is rendered.
///
/// # Examples
///
/// ```
/// use helpdesk_export::domain::customer::CustomerBuilder;
/// use helpdesk_export::domain::ids::CustomerId;
/// use chrono::Utc;
///
/// let customer = CustomerBuilder::new()
///     .id(CustomerId::new(1).unwrap())
///     .name("Ada Lovelace")
///     .primary_email("ada@example.com")
///     .date_created(Utc::now())
///     .build()
///     .unwrap();
/// assert_eq!(customer.ticket_count, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier
    pub id: CustomerId,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Primary email address
    #[serde(default)]
    pub primary_email: Option<String>,

    /// Additional email addresses, excluding the primary one
    #[serde(default)]
    pub additional_emails: Vec<String>,

    /// Name of the company the customer belongs to
    #[serde(default)]
    pub company: Option<String>,

    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Website
    #[serde(default)]
    pub website: Option<String>,

    /// Number of tickets logged by the customer
    #[serde(default)]
    pub ticket_count: u64,

    /// When the customer record was created
    pub date_created: DateTime<Utc>,
}

impl Customer {
    /// Creates a new builder for constructing a Customer
    pub fn builder() -> CustomerBuilder {
        CustomerBuilder::default()
    }
}

/// Builder for constructing Customer instances
#[derive(Debug, Default)]
pub struct CustomerBuilder {
    id: Option<CustomerId>,
    name: Option<String>,
    primary_email: Option<String>,
    additional_emails: Vec<String>,
    company: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    ticket_count: u64,
    date_created: Option<DateTime<Utc>>,
}

impl CustomerBuilder {
    /// Creates a new CustomerBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the customer ID
    pub fn id(mut self, id: CustomerId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the primary email
    pub fn primary_email(mut self, email: impl Into<String>) -> Self {
        self.primary_email = Some(email.into());
        self
    }

    /// Adds an additional email
    pub fn additional_email(mut self, email: impl Into<String>) -> Self {
        self.additional_emails.push(email.into());
        self
    }

    /// Sets the company name
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the phone number
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the website
    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Sets the ticket count
    pub fn ticket_count(mut self, count: u64) -> Self {
        self.ticket_count = count;
        self
    }

    /// Sets the creation date
    pub fn date_created(mut self, date: DateTime<Utc>) -> Self {
        self.date_created = Some(date);
        self
    }

    /// Builds the Customer
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<Customer, String> {
        Ok(Customer {
            id: self.id.ok_or("id is required")?,
            name: self.name,
            primary_email: self.primary_email,
            additional_emails: self.additional_emails,
            company: self.company,
            phone: self.phone,
            website: self.website,
            ticket_count: self.ticket_count,
            date_created: self.date_created.ok_or("date_created is required")?,
        })
    }
}
