//! Batch job state tracking
//!
//! Per-request state machine for batch jobs. See [`machine`] for the
//! transitions.

pub mod machine;

pub use machine::{JobEvent, JobState};
