//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - Console output
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use helpdesk_export::logging::init_logging;
//! use helpdesk_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a batch step
///
/// # Example
///
/// ```no_run
/// use helpdesk_export::log_step_start;
/// use helpdesk_export::domain::JobType;
///
/// log_step_start!(JobType::TicketsExport, 2);
/// ```
#[macro_export]
macro_rules! log_step_start {
    ($job_type:expr, $step:expr) => {
        tracing::info!(
            job_type = %$job_type,
            step = $step,
            "Processing batch step"
        );
    };
}

/// Log the completion of a batch job
///
/// # Example
///
/// ```no_run
/// use helpdesk_export::log_job_complete;
/// use helpdesk_export::domain::JobType;
///
/// log_job_complete!(JobType::CustomersExport, 3, 65);
/// ```
#[macro_export]
macro_rules! log_job_complete {
    ($job_type:expr, $steps:expr, $total:expr) => {
        tracing::info!(
            job_type = %$job_type,
            steps = $steps,
            total_records = $total,
            "Batch job completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use helpdesk_export::log_error_with_context;
/// use helpdesk_export::domain::HelpdeskError;
///
/// let error = HelpdeskError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
