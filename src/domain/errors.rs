//! Domain error types
//!
//! This module defines the error hierarchy for the export service.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Batch pipeline errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Database-related errors (generic)
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Batch pipeline errors
///
/// Every variant is fatal for the request that raised it. None of them is
/// retried by the server; the orchestrator converts them into a structured
/// error response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Missing, malformed, expired or mismatched anti-forgery token
    #[error("You do not have permission to perform this action")]
    AuthorizationFailed,

    /// The output artifact location cannot be written
    #[error("Export location or file not writable: {0}")]
    DestinationNotWritable(String),

    /// The record store could not be reached or read
    #[error("Record store unavailable: {0}")]
    SourceUnavailable(String),

    /// No adapter/mapper pair is registered for the job type
    #[error("Unknown batch job type: {0}")]
    UnknownJobType(String),

    /// A step after the first arrived for a job that was never started
    #[error("Batch job has not been started; restart from step 1")]
    JobNotStarted,

    /// A step arrived for a job that already failed or finished
    #[error("Batch job is no longer accepting steps: {0}")]
    JobClosed(String),

    /// A record could not be projected into an output row
    #[error("Failed to map record: {0}")]
    Mapping(String),

    /// Step number outside the accepted range
    #[error("Invalid step: {0}")]
    InvalidStep(String),

    /// Filters that do not apply to the job type or are inconsistent
    #[error("Invalid filters: {0}")]
    InvalidFilters(String),

    /// Settings payload rejected by the importer
    #[error("Invalid settings file: {0}")]
    InvalidSettings(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for HelpdeskError {
    fn from(err: std::io::Error) -> Self {
        HelpdeskError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HelpdeskError {
    fn from(err: serde_json::Error) -> Self {
        HelpdeskError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HelpdeskError {
    fn from(err: toml::de::Error) -> Self {
        HelpdeskError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for HelpdeskError {
    fn from(err: csv::Error) -> Self {
        HelpdeskError::Serialization(format!("CSV error: {err}"))
    }
}

impl HelpdeskError {
    /// Message suitable for the client-facing error response
    ///
    /// Batch errors carry their own wording; everything else is reported
    /// through its display form.
    pub fn client_message(&self) -> String {
        match self {
            HelpdeskError::Batch(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HelpdeskError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_batch_error_conversion() {
        let batch_err = BatchError::SourceUnavailable("connection refused".to_string());
        let err: HelpdeskError = batch_err.into();
        assert!(matches!(
            err,
            HelpdeskError::Batch(BatchError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_client_message_strips_prefix_for_batch_errors() {
        let err: HelpdeskError = BatchError::AuthorizationFailed.into();
        assert_eq!(
            err.client_message(),
            "You do not have permission to perform this action"
        );

        let err = HelpdeskError::Io("disk full".to_string());
        assert_eq!(err.client_message(), "I/O error: disk full");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: HelpdeskError = io_err.into();
        assert!(matches!(err, HelpdeskError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HelpdeskError = json_err.into();
        assert!(matches!(err, HelpdeskError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: HelpdeskError = toml_err.into();
        assert!(matches!(err, HelpdeskError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
