//! Opaque record values handed from the record store to the column mappers

use super::customer::Customer;
use super::ticket::Ticket;
use chrono::{DateTime, Utc};

/// A single exportable record
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A customer record
    Customer(Customer),
    /// A ticket record
    Ticket(Ticket),
}

impl Record {
    /// Short kind name, used in log fields and mapping errors
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Customer(_) => "customer",
            Record::Ticket(_) => "ticket",
        }
    }

    /// Creation timestamp used for ordering
    pub fn date_created(&self) -> DateTime<Utc> {
        match self {
            Record::Customer(c) => c.date_created,
            Record::Ticket(t) => t.date_created,
        }
    }
}

impl From<Customer> for Record {
    fn from(customer: Customer) -> Self {
        Record::Customer(customer)
    }
}

impl From<Ticket> for Record {
    fn from(ticket: Ticket) -> Self {
        Record::Ticket(ticket)
    }
}
