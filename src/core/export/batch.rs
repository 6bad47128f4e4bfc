//! Batch step execution
//!
//! Runs one step of an export: fetch the step's page, map it, hand the rows
//! to a sink and report progress. The executor holds no state between steps;
//! everything it needs arrives in the [`BatchJob`].

use crate::core::export::columns::{ColumnMapper, ColumnSpec, Row};
use crate::core::export::progress::percentage;
use crate::core::export::source::{RecordSource, PAGE_SIZE};
use crate::domain::{BatchError, BatchJob};
use async_trait::async_trait;
use std::sync::Arc;

/// Status set on a job whose first step finds nothing to export
pub const NO_DATA_FOUND: &str = "No data found for export parameters";

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStepResult {
    /// Rows produced by this step, in record order
    pub rows: Vec<Row>,

    /// Estimated completion, 0 to 100
    pub percentage: u8,

    /// Whether the client should request another step
    pub should_continue: bool,
}

/// Destination for the rows of each step
#[async_trait]
pub trait RowSink: Send {
    /// Append rows after any already written
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be written.
    async fn append(&mut self, rows: &[Row]) -> Result<(), BatchError>;
}

#[async_trait]
impl RowSink for Vec<Row> {
    async fn append(&mut self, rows: &[Row]) -> Result<(), BatchError> {
        self.extend_from_slice(rows);
        Ok(())
    }
}

/// Executes single steps for one job type
pub struct BatchStepExecutor {
    source: Arc<dyn RecordSource>,
    mapper: Arc<dyn ColumnMapper>,
}

impl BatchStepExecutor {
    /// Pairs a record source with its column mapper
    pub fn new(source: Arc<dyn RecordSource>, mapper: Arc<dyn ColumnMapper>) -> Self {
        Self { source, mapper }
    }

    /// Output columns for this job type
    pub fn columns(&self) -> &ColumnSpec {
        self.mapper.columns()
    }

    /// Process `job.step`
    ///
    /// Updates `job.is_empty` and `job.done`. A page shorter than the page
    /// size is treated as the last one, so a job finishes on the step that
    /// returns its final records unless the record count is an exact multiple
    /// of the page size; in that case the following empty step finishes it.
    ///
    /// # Errors
    ///
    /// Returns `DestinationNotWritable` if the job's destination is not
    /// writable, `SourceUnavailable` if the store fails, `Mapping` if a record
    /// cannot be mapped, or any error from the sink. The job is not marked
    /// done on error, and a failed step hands nothing to the sink.
    pub async fn process_step(
        &self,
        job: &mut BatchJob,
        sink: &mut dyn RowSink,
    ) -> Result<BatchStepResult, BatchError> {
        if !job.is_writable {
            return Err(BatchError::DestinationNotWritable(
                "export destination is not writable".to_string(),
            ));
        }

        let records = self.source.fetch_page(job.step, &job.filters).await?;

        if records.is_empty() {
            if job.is_first_step() {
                job.is_empty = true;
                job.message = Some(NO_DATA_FOUND.to_string());
            } else {
                job.done = true;
            }
            return Ok(BatchStepResult {
                rows: Vec::new(),
                percentage: 100,
                should_continue: false,
            });
        }

        let rows = records
            .iter()
            .map(|record| self.mapper.map(record))
            .collect::<Result<Vec<Row>, BatchError>>()?;

        let last_page = (rows.len() as u64) < PAGE_SIZE;
        let pct = if last_page {
            100
        } else {
            let total = self.source.total(&job.filters).await?;
            percentage(total, job.step, PAGE_SIZE)
        };

        sink.append(&rows).await?;
        job.done = last_page;

        tracing::debug!(
            job_type = %job.job_type,
            step = job.step,
            rows = rows.len(),
            percentage = pct,
            done = job.done,
            "Batch step processed"
        );

        Ok(BatchStepResult {
            rows,
            percentage: pct,
            should_continue: !job.done,
        })
    }
}
