//! Parsing and formatting of single coordinate components.
//!
//! Accepted input is a plain decimal number, optionally surrounded by
//! whitespace: `8.36`, `-124.86`, `1e1`. Trailing garbage is rejected.

use crate::{GeoError, Result, DISPLAY_PRECISION};

/// Which half of a coordinate a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// North/south, -90 to 90
    Latitude,
    /// East/west, -180 to 180
    Longitude,
}

impl Axis {
    /// Field name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }

    /// Inclusive bound on the absolute value.
    pub const fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    /// Checks that `value` is finite and within range.
    pub fn check(self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(GeoError::InvalidNumber {
                field: self.name(),
                value: value.to_string(),
            });
        }
        let limit = self.limit();
        if value < -limit || value > limit {
            return Err(GeoError::OutOfRange {
                field: self.name(),
                value,
                min: -limit,
                max: limit,
            });
        }
        Ok(value)
    }
}

/// Parses one component from user input.
///
/// # Example
/// ```
/// use fixmap_geo::{parse_degrees, Axis};
///
/// assert_eq!(parse_degrees(Axis::Latitude, " 8.36 ").unwrap(), 8.36);
/// assert!(parse_degrees(Axis::Longitude, "200").is_err());
/// assert!(parse_degrees(Axis::Latitude, "").is_err());
/// ```
pub fn parse_degrees(axis: Axis, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GeoError::Missing { field: axis.name() });
    }

    let value: f64 = trimmed.parse().map_err(|_| GeoError::InvalidNumber {
        field: axis.name(),
        value: trimmed.to_string(),
    })?;

    axis.check(value)
}

/// Formats one component with the display precision.
#[inline]
pub fn format_degrees(value: f64) -> String {
    format!("{:.*}", DISPLAY_PRECISION, value)
}
