//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur while building a coordinate from untrusted input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// The field was left empty
    #[error("{field} is required")]
    Missing {
        /// Field name ("latitude" or "longitude")
        field: &'static str,
    },

    /// The field does not contain a finite number
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber {
        /// Field name
        field: &'static str,
        /// Raw text as entered
        value: String,
    },

    /// The number lies outside the allowed range
    #[error("{field} {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Parsed value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
}

/// Error code for integration with fixmap-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Empty field
    Missing = 10001,
    /// Unparsable number
    InvalidNumber = 10002,
    /// Value out of range
    OutOfRange = 10003,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::Missing { .. } => GeoErrorCode::Missing,
            GeoError::InvalidNumber { .. } => GeoErrorCode::InvalidNumber,
            GeoError::OutOfRange { .. } => GeoErrorCode::OutOfRange,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            GeoError::Missing { field }
            | GeoError::InvalidNumber { field, .. }
            | GeoError::OutOfRange { field, .. } => field,
        }
    }
}
