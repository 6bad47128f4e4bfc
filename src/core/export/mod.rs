//! Batch export pipeline
//!
//! Leaves first:
//! - [`source`] - paged record sources over the record store
//! - [`columns`] - column specs and record to row mapping
//! - [`progress`] - completion estimate
//! - [`batch`] - single step execution
//! - [`artifact`] - CSV artifact files
//! - [`orchestrator`] - request handling and job lifecycle
//! - [`runner`] and [`summary`] - driving a whole job in-process

pub mod artifact;
pub mod batch;
pub mod columns;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod source;
pub mod summary;

pub use artifact::{ArtifactStatus, ArtifactStore, Download};
pub use batch::{BatchStepExecutor, BatchStepResult, RowSink, NO_DATA_FOUND};
pub use columns::{ColumnMapper, ColumnSpec, CustomerColumns, Row, TicketColumns};
pub use orchestrator::{BatchOrchestrator, StepRequest, StepResponse};
pub use progress::percentage;
pub use runner::{JobRunner, RunResult};
pub use source::{CustomerSource, RecordSource, TicketSource, PAGE_SIZE};
pub use summary::{ExportOutcome, ExportSummary};
