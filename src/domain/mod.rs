//! Domain models and types.
//!
//! This module contains the core domain models, types, and business rules of
//! the export service.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CustomerId`], [`TicketId`], [`ArtifactKey`])
//! - **Record models** ([`Customer`], [`Ticket`], wrapped by [`Record`])
//! - **Batch job model** ([`JobType`], [`JobFilters`], [`BatchJob`])
//! - **Error types** ([`HelpdeskError`], [`BatchError`])
//! - **Result type alias** ([`Result`])
//!
//! # Closed job registry
//!
//! Job types arrive from the client as strings and are parsed into the closed
//! [`JobType`] enum. An unknown string is rejected with
//! [`BatchError::UnknownJobType`]:
//!
//! ```rust
//! use helpdesk_export::domain::{BatchError, JobType};
//!
//! let job_type: JobType = "customers-export".parse().unwrap();
//! assert_eq!(job_type.action(), "batch-export");
//!
//! let err = "SomeClass".parse::<JobType>().unwrap_err();
//! assert!(matches!(err, BatchError::UnknownJobType(_)));
//! ```

pub mod customer;
pub mod errors;
pub mod ids;
pub mod job;
pub mod record;
pub mod result;
pub mod ticket;

// Re-export commonly used types for convenience
pub use customer::{Customer, CustomerBuilder};
pub use errors::{BatchError, HelpdeskError};
pub use ids::{ArtifactKey, CustomerId, TicketId};
pub use job::{BatchJob, JobFilters, JobType};
pub use record::Record;
pub use result::Result;
pub use ticket::{Ticket, TicketBuilder, TicketStatus};
