//! In-process job driver
//!
//! Plays the client's role against a [`BatchOrchestrator`]: issues a token,
//! requests steps until the job ends and redeems the download. Used by the
//! `export` command to run a job without the HTTP server.

use crate::core::export::artifact::Download;
use crate::core::export::batch::NO_DATA_FOUND;
use crate::core::export::orchestrator::{BatchOrchestrator, StepRequest, StepResponse};
use crate::core::export::summary::{ExportOutcome, ExportSummary};
use crate::domain::{HelpdeskError, JobFilters, JobType, Result};
use serde_json::Value;
use std::time::Instant;
use tokio::sync::watch;

/// Result of a locally driven job
#[derive(Debug)]
pub struct RunResult {
    /// What happened
    pub summary: ExportSummary,

    /// The artifact, for a completed export
    pub download: Option<Download>,
}

/// Drives jobs step by step against an orchestrator
pub struct JobRunner<'a> {
    orchestrator: &'a BatchOrchestrator,
    shutdown: watch::Receiver<bool>,
}

impl<'a> JobRunner<'a> {
    /// Creates a runner that stops between steps once `shutdown` turns true
    pub fn new(orchestrator: &'a BatchOrchestrator, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            orchestrator,
            shutdown,
        }
    }

    /// Run `job_type` to completion
    ///
    /// # Errors
    ///
    /// Returns an error only if a token cannot be issued or the finished
    /// artifact cannot be read. Step failures are reported in the summary.
    pub async fn run(
        &self,
        job_type: JobType,
        filters: JobFilters,
        settings: Option<Value>,
    ) -> Result<RunResult> {
        let started = Instant::now();
        let token = self.orchestrator.tokens().issue(job_type.action())?;
        let mut summary = ExportSummary::new(job_type);
        let mut download = None;
        let mut step = 1;

        loop {
            if *self.shutdown.borrow() {
                tracing::warn!(job_type = %job_type, step = step, "Shutdown requested, stopping job");
                summary.outcome = ExportOutcome::Interrupted;
                break;
            }

            let mut request = StepRequest::new(job_type, step, token.clone());
            request.filters = filters.clone();
            request.settings = settings.clone();

            summary.steps = step;
            match self.orchestrator.handle(request).await {
                StepResponse::Progress {
                    step: next,
                    percentage,
                } => {
                    tracing::info!(job_type = %job_type, step = step, percentage = percentage, "Step complete");
                    summary.percentage = percentage;
                    step = next;
                }
                StepResponse::Done { url } => {
                    summary.percentage = 100;
                    let handle = url.rsplit('/').next().unwrap_or_default();
                    let taken = self
                        .orchestrator
                        .take_download(handle)
                        .await?
                        .ok_or_else(|| {
                            HelpdeskError::Other(format!(
                                "finalized artifact for {job_type} is missing"
                            ))
                        })?;
                    summary.rows = count_rows(&taken.content)?;
                    summary.outcome = ExportOutcome::Completed;
                    download = Some(taken);
                    break;
                }
                StepResponse::Success { .. } => {
                    summary.percentage = 100;
                    summary.outcome = ExportOutcome::Imported;
                    break;
                }
                StepResponse::Error { message } if message == NO_DATA_FOUND => {
                    summary.outcome = ExportOutcome::NoData;
                    break;
                }
                StepResponse::Error { message } => {
                    summary.outcome = ExportOutcome::Failed(message);
                    break;
                }
            }
        }

        Ok(RunResult {
            summary: summary.with_duration(started.elapsed()),
            download,
        })
    }
}

/// Data rows in a CSV artifact, excluding the header
fn count_rows(content: &[u8]) -> Result<usize> {
    let mut reader = csv::Reader::from_reader(content);
    let mut rows = 0;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_rows_skips_header() {
        let csv = b"ID,Title\n1,\"multi\nline\"\n2,plain\n";
        assert_eq!(count_rows(csv).unwrap(), 2);
        assert_eq!(count_rows(b"ID,Title\n").unwrap(), 0);
    }
}
