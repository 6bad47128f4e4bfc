//! Batch job model
//!
//! A batch job has no server-side row. Everything here is rebuilt from the
//! client's request on every step and dropped when the response is sent.

use super::errors::BatchError;
use super::ticket::TicketStatus;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered batch job types
///
/// This is the closed set of jobs the service knows how to run. Client input
/// is parsed into it with [`JobType::from_str`]; nothing is instantiated by
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    /// Export customers to CSV
    CustomersExport,
    /// Export tickets to CSV
    TicketsExport,
    /// Import plugin settings from a JSON document
    SettingsImport,
}

impl JobType {
    /// Slug used on the wire and in artifact names
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::CustomersExport => "customers-export",
            JobType::TicketsExport => "tickets-export",
            JobType::SettingsImport => "settings-import",
        }
    }

    /// Operation name the anti-forgery token must be scoped to
    pub fn action(&self) -> &'static str {
        match self {
            JobType::CustomersExport | JobType::TicketsExport => "batch-export",
            JobType::SettingsImport => "batch-import",
        }
    }

    /// Whether the job produces no downloadable artifact
    pub fn is_void(&self) -> bool {
        matches!(self, JobType::SettingsImport)
    }

    /// All registered job types
    pub fn all() -> [JobType; 3] {
        [
            JobType::CustomersExport,
            JobType::TicketsExport,
            JobType::SettingsImport,
        ]
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::all()
            .into_iter()
            .find(|job_type| job_type.as_str() == s)
            .ok_or_else(|| BatchError::UnknownJobType(s.to_string()))
    }
}

/// Filters supplied by the client when starting a job
///
/// Dates are inclusive calendar days in UTC. `status` and `category` only
/// apply to ticket exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    /// First day to include
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Last day to include
    #[serde(default)]
    pub end: Option<NaiveDate>,

    /// Ticket status
    #[serde(default)]
    pub status: Option<TicketStatus>,

    /// Ticket category name
    #[serde(default)]
    pub category: Option<String>,
}

impl JobFilters {
    /// Validates that the filters make sense for the given job type
    pub fn validate_for(&self, job_type: JobType) -> Result<(), BatchError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(BatchError::InvalidFilters(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }

        match job_type {
            JobType::CustomersExport => {
                if self.status.is_some() || self.category.is_some() {
                    return Err(BatchError::InvalidFilters(
                        "status and category filters only apply to ticket exports".to_string(),
                    ));
                }
            }
            JobType::TicketsExport => {
                if matches!(self.category.as_deref(), Some(c) if c.trim().is_empty()) {
                    return Err(BatchError::InvalidFilters(
                        "category filter cannot be empty".to_string(),
                    ));
                }
            }
            JobType::SettingsImport => {
                if *self != JobFilters::default() {
                    return Err(BatchError::InvalidFilters(
                        "settings import does not accept filters".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Inclusive lower bound on creation time
    pub fn created_after(&self) -> Option<DateTime<Utc>> {
        self.start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Exclusive upper bound on creation time (midnight after `end`)
    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Whether a creation timestamp falls inside the date range
    pub fn contains(&self, created: &DateTime<Utc>) -> bool {
        self.created_after().map_or(true, |after| *created >= after)
            && self.created_before().map_or(true, |before| *created < before)
    }
}

/// One in-progress batch run, as seen by a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    /// What is being run
    pub job_type: JobType,

    /// Current step, starting at 1
    pub step: u32,

    /// Type-specific filters
    pub filters: JobFilters,

    /// Whether the output destination can be written
    pub is_writable: bool,

    /// Set when step 1 finds no records at all
    pub is_empty: bool,

    /// Set once all steps are complete
    pub done: bool,

    /// Human-readable status
    pub message: Option<String>,
}

impl BatchJob {
    /// Creates a job for the given step
    ///
    /// # Errors
    ///
    /// Returns `InvalidStep` if `step` is zero
    pub fn new(job_type: JobType, step: u32, filters: JobFilters) -> Result<Self, BatchError> {
        if step == 0 {
            return Err(BatchError::InvalidStep(
                "step must be 1 or greater".to_string(),
            ));
        }

        Ok(Self {
            job_type,
            step,
            filters,
            is_writable: false,
            is_empty: false,
            done: false,
            message: None,
        })
    }

    /// Whether this request starts the job
    pub fn is_first_step(&self) -> bool {
        self.step == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_job_type_parse() {
        assert_eq!(
            "tickets-export".parse::<JobType>().unwrap(),
            JobType::TicketsExport
        );
        assert_eq!(
            "KBS_Batch_Export_Tickets".parse::<JobType>().unwrap_err(),
            BatchError::UnknownJobType("KBS_Batch_Export_Tickets".to_string())
        );
    }

    #[test]
    fn test_job_type_actions() {
        assert_eq!(JobType::CustomersExport.action(), "batch-export");
        assert_eq!(JobType::SettingsImport.action(), "batch-import");
        assert!(JobType::SettingsImport.is_void());
        assert!(!JobType::TicketsExport.is_void());
    }

    #[test]
    fn test_filters_reject_ticket_fields_on_customers() {
        let filters = JobFilters {
            status: Some(TicketStatus::Open),
            ..Default::default()
        };
        assert!(filters.validate_for(JobType::CustomersExport).is_err());
        assert!(filters.validate_for(JobType::TicketsExport).is_ok());
    }

    #[test]
    fn test_filters_reject_inverted_range() {
        let filters = JobFilters {
            start: NaiveDate::from_ymd_opt(2024, 5, 2),
            end: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..Default::default()
        };
        assert!(matches!(
            filters.validate_for(JobType::TicketsExport),
            Err(BatchError::InvalidFilters(_))
        ));
    }

    #[test]
    fn test_filters_contains_is_inclusive_of_end_day() {
        let filters = JobFilters {
            start: NaiveDate::from_ymd_opt(2024, 5, 1),
            end: NaiveDate::from_ymd_opt(2024, 5, 31),
            ..Default::default()
        };

        let first = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(filters.contains(&first));
        assert!(filters.contains(&last));
        assert!(!filters.contains(&after));
    }

    #[test]
    fn test_batch_job_rejects_step_zero() {
        assert!(BatchJob::new(JobType::TicketsExport, 0, JobFilters::default()).is_err());
        let job = BatchJob::new(JobType::TicketsExport, 1, JobFilters::default()).unwrap();
        assert!(job.is_first_step());
        assert!(!job.is_writable);
    }
}
