//! Domain errors.

use thiserror::Error;

/// Validation errors raised when building value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}
