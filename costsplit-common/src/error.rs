//! Common error types for cost split handling

use std::fmt;
use thiserror::Error;

/// Common result type for cost split operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the cost split crates
#[derive(Error, Debug)]
pub enum Error {
    /// Allocation set rejected by the validator
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested allocation not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input document
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Which date of an allocation failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    StartDate,
    EndDate,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::StartDate => write!(f, "start"),
            DateField::EndDate => write!(f, "end"),
        }
    }
}

/// Reasons an allocation set is rejected
///
/// `index` is the position of the offending allocation in the input slice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("At least one cost split required")]
    EmptyAllocationSet,

    #[error("Invalid {field} date (allocation {index})")]
    InvalidDate { field: DateField, index: usize },

    #[error("End date must be after start date (allocation {index})")]
    InvalidDateRange { index: usize },

    #[error("Percentage must be between 0 and 100 (allocation {index})")]
    InvalidPercentage { index: usize },

    #[error("Cost split percentages exceed 100% for overlapping periods")]
    OverlapExceeds100,
}
