//! Result type alias
//!
//! This module provides a convenient Result type alias that uses
//! `HelpdeskError` as the error type.

use super::errors::HelpdeskError;

/// Result type alias for export service operations
///
/// # Examples
///
/// ```
/// use helpdesk_export::domain::result::Result;
/// use helpdesk_export::domain::errors::HelpdeskError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HelpdeskError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HelpdeskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{BatchError, HelpdeskError};

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(HelpdeskError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> std::result::Result<i32, BatchError> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
