//! Export summary and reporting
//!
//! Results of driving a whole job in-process, as the `export` command does.

use crate::domain::JobType;
use std::time::Duration;

/// How a locally driven job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The artifact was finalized and downloaded
    Completed,
    /// Step 1 found no records
    NoData,
    /// A void job finished
    Imported,
    /// A step failed
    Failed(String),
    /// Shutdown was requested between steps
    Interrupted,
}

/// Summary of one locally driven job
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Job that was run
    pub job_type: JobType,

    /// Steps requested, including the final one
    pub steps: u32,

    /// Data rows in the artifact, excluding the header
    pub rows: usize,

    /// Last reported percentage
    pub percentage: u8,

    /// Wall-clock time
    pub duration: Duration,

    /// How the job ended
    pub outcome: ExportOutcome,
}

impl ExportSummary {
    /// Create an empty summary for `job_type`
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            steps: 0,
            rows: 0,
            percentage: 0,
            duration: Duration::from_secs(0),
            outcome: ExportOutcome::Interrupted,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the job ended without error
    ///
    /// An export with no matching records counts as successful.
    pub fn is_successful(&self) -> bool {
        matches!(
            self.outcome,
            ExportOutcome::Completed | ExportOutcome::NoData | ExportOutcome::Imported
        )
    }

    /// Log the summary
    pub fn log_summary(&self) {
        match &self.outcome {
            ExportOutcome::Failed(message) => tracing::error!(
                job_type = %self.job_type,
                steps = self.steps,
                percentage = self.percentage,
                duration_secs = self.duration.as_secs(),
                error = %message,
                "Export failed"
            ),
            ExportOutcome::Interrupted => tracing::warn!(
                job_type = %self.job_type,
                steps = self.steps,
                percentage = self.percentage,
                "Export interrupted before completion"
            ),
            outcome => tracing::info!(
                job_type = %self.job_type,
                steps = self.steps,
                rows = self.rows,
                duration_secs = self.duration.as_secs(),
                outcome = ?outcome,
                "Export finished"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary_is_not_successful() {
        let summary = ExportSummary::new(JobType::TicketsExport);
        assert_eq!(summary.outcome, ExportOutcome::Interrupted);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_no_data_is_successful() {
        let mut summary = ExportSummary::new(JobType::CustomersExport);
        summary.outcome = ExportOutcome::NoData;
        assert!(summary.is_successful());

        summary.outcome = ExportOutcome::Failed("boom".to_string());
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_with_duration() {
        let summary =
            ExportSummary::new(JobType::TicketsExport).with_duration(Duration::from_secs(5));
        assert_eq!(summary.duration.as_secs(), 5);
    }
}
