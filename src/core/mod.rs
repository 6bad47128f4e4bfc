//! Core batch processing logic.
//!
//! # Modules
//!
//! - [`export`] - Record sources, column mapping, step execution, artifacts
//!   and the orchestrator
//! - [`import`] - The settings import job
//! - [`state`] - Per-request job state machine
//!
//! # Step Workflow
//!
//! Each client request runs exactly one step:
//!
//! 1. **Authorize**: verify the anti-forgery token for the job's action
//! 2. **Resume**: locate the job's artifact from its type and token
//! 3. **Fetch**: read page `step` (30 records) from the record store
//! 4. **Map**: turn each record into a row of display strings
//! 5. **Append**: add the rows to the partial CSV artifact
//! 6. **Report**: return progress, or finalize and return a download URL
//!
//! # Example
//!
//! ```rust
//! use helpdesk_export::adapters::store::{MemoryStore, Stores};
//! use helpdesk_export::config::secret_string;
//! use helpdesk_export::core::export::{ArtifactStore, BatchOrchestrator, StepRequest, StepResponse};
//! use helpdesk_export::domain::JobType;
//! use helpdesk_export::security::TokenAuthority;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = TokenAuthority::new(
//!     secret_string("0123456789abcdef0123456789abcdef".to_string()),
//!     3600,
//!     600,
//! );
//! let orchestrator = BatchOrchestrator::new(
//!     Stores::from_backend(Arc::new(MemoryStore::new())),
//!     ArtifactStore::new("./exports"),
//!     tokens,
//!     "%B %-d, %Y",
//!     "http://localhost:8080",
//! );
//!
//! let token = orchestrator.tokens().issue("batch-export")?;
//! let response = orchestrator
//!     .handle(StepRequest::new(JobType::CustomersExport, 1, token))
//!     .await;
//! assert!(matches!(response, StepResponse::Error { .. })); // no customers yet
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod import;
pub mod state;
