//! Ticket domain model

use super::ids::TicketId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Logged but not yet picked up
    New,
    /// Being worked on
    Open,
    /// Waiting on the customer or a third party
    Hold,
    /// Resolved
    Closed,
}

impl TicketStatus {
    /// Slug used in storage and filters
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Hold => "hold",
            TicketStatus::Closed => "closed",
        }
    }

    /// Human-readable label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::New => "New",
            TicketStatus::Open => "Open",
            TicketStatus::Hold => "On Hold",
            TicketStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(TicketStatus::New),
            "open" => Ok(TicketStatus::Open),
            "hold" => Ok(TicketStatus::Hold),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(format!(
                "Invalid ticket status '{other}'. Must be one of: new, open, hold, closed"
            )),
        }
    }
}

/// A help-desk ticket record
///
/// Customer, company and agent are denormalised display values resolved by
/// the store; any of them may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier
    pub id: TicketId,

    /// Sequential ticket number, when numbering is enabled
    #[serde(default)]
    pub number: Option<String>,

    /// Ticket title
    #[serde(default)]
    pub title: Option<String>,

    /// Current status
    pub status: TicketStatus,

    /// When the ticket was logged
    pub date_created: DateTime<Utc>,

    /// When the ticket was last modified
    #[serde(default)]
    pub date_modified: Option<DateTime<Utc>>,

    /// Customer display name
    #[serde(default)]
    pub customer_name: Option<String>,

    /// Customer email
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Company display name
    #[serde(default)]
    pub company: Option<String>,

    /// Assigned agent display name
    #[serde(default)]
    pub agent: Option<String>,

    /// Category names
    #[serde(default)]
    pub categories: Vec<String>,

    /// Channel the ticket was logged through (email, website, phone...)
    #[serde(default)]
    pub source: Option<String>,
}

impl Ticket {
    /// Creates a new builder for constructing a Ticket
    pub fn builder() -> TicketBuilder {
        TicketBuilder::default()
    }
}

/// Builder for constructing Ticket instances
#[derive(Debug, Default)]
pub struct TicketBuilder {
    id: Option<TicketId>,
    number: Option<String>,
    title: Option<String>,
    status: Option<TicketStatus>,
    date_created: Option<DateTime<Utc>>,
    date_modified: Option<DateTime<Utc>>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    company: Option<String>,
    agent: Option<String>,
    categories: Vec<String>,
    source: Option<String>,
}

impl TicketBuilder {
    /// Creates a new TicketBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ticket ID
    pub fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the ticket number
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Sets the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the status
    pub fn status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the creation date
    pub fn date_created(mut self, date: DateTime<Utc>) -> Self {
        self.date_created = Some(date);
        self
    }

    /// Sets the modification date
    pub fn date_modified(mut self, date: DateTime<Utc>) -> Self {
        self.date_modified = Some(date);
        self
    }

    /// Sets the customer name and email
    pub fn customer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_email = Some(email.into());
        self
    }

    /// Sets the company name
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the assigned agent
    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Adds a category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Sets the source channel
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builds the Ticket
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<Ticket, String> {
        Ok(Ticket {
            id: self.id.ok_or("id is required")?,
            number: self.number,
            title: self.title,
            status: self.status.unwrap_or(TicketStatus::New),
            date_created: self.date_created.ok_or("date_created is required")?,
            date_modified: self.date_modified,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            company: self.company,
            agent: self.agent,
            categories: self.categories,
            source: self.source,
        })
    }
}
