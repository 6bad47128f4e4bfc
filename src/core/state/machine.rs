//! Batch job state machine
//!
//! A job's state only lives for one request. It is rebuilt from the step
//! number on arrival, advanced by what the step produced, and discarded with
//! the response. Terminal outcomes that must outlive the request (failed,
//! finalized) are recorded by the artifact store instead.
//!
//! ```text
//! Started --accepted--> Stepping --more--> Stepping
//!                          |--no data--> Empty
//!                          |--exhausted--> Finalizing --finalized--> Done
//!                          `--fatal--> Failed
//! ```

use crate::domain::BatchError;
use std::fmt;

/// Where a job is within the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Step 1 arrived; nothing written yet
    Started,
    /// Pages are being processed
    Stepping,
    /// Step 1 found no records
    Empty,
    /// All records written; artifact being finalized
    Finalizing,
    /// Artifact finalized and handed out
    Done,
    /// A fatal error ended the job
    Failed,
}

/// Something that happened while handling a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    /// The request was authorized and the destination prepared
    Accepted,
    /// The step wrote rows and more remain
    MoreRemaining,
    /// Step 1 returned no records
    NoData,
    /// The last page has been written
    Exhausted,
    /// The artifact was moved to its final name
    Finalized,
    /// A fatal error occurred
    Fatal,
}

impl JobState {
    /// State a request starts in, from the step it carries
    pub fn resume(step: u32) -> Self {
        if step <= 1 {
            JobState::Started
        } else {
            JobState::Stepping
        }
    }

    /// Apply an event
    ///
    /// # Errors
    ///
    /// Returns `JobClosed` for an event that is not valid in this state.
    pub fn on(self, event: JobEvent) -> Result<JobState, BatchError> {
        use JobEvent::*;
        use JobState::*;

        if self.is_terminal() {
            return Err(BatchError::JobClosed(format!("job is already {self}")));
        }

        let next = match (self, event) {
            (Started, Accepted) => Stepping,
            (Stepping, Accepted) => Stepping,
            (Stepping, MoreRemaining) => Stepping,
            (Stepping, NoData) => Empty,
            (Stepping, Exhausted) => Finalizing,
            (Finalizing, Finalized) => Done,
            (Started | Stepping | Finalizing, Fatal) => Failed,
            (state, event) => {
                return Err(BatchError::JobClosed(format!(
                    "cannot apply {event:?} to a job that is {state}"
                )))
            }
        };

        tracing::trace!(from = %self, to = %next, event = ?event, "Job state transition");
        Ok(next)
    }

    /// Whether no further events are accepted
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Empty | JobState::Done | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Started => "started",
            JobState::Stepping => "stepping",
            JobState::Empty => "empty",
            JobState::Finalizing => "finalizing",
            JobState::Done => "done",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}
