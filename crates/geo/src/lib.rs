//! Geographic coordinates for the Fixmap issue reporter.
//!
//! This crate provides:
//! - The [`Coordinate`] value type used by every other Fixmap crate
//! - Range validation for user-entered latitude/longitude
//! - Fixed 4-decimal formatting used by status readouts, cards and popups
//!
//! # Example
//!
//! ```
//! use fixmap_geo::Coordinate;
//!
//! let coord = Coordinate::parse_manual("8.36", "124.86").unwrap();
//! assert_eq!(coord.to_string(), "8.3600, 124.8600");
//!
//! assert!(Coordinate::parse_manual("91", "0").is_err());
//! ```

mod error;
mod parse;

pub use error::{GeoError, GeoErrorCode, Result};
pub use parse::{format_degrees, parse_degrees, Axis};

use std::fmt;

/// Number of decimals shown whenever a coordinate is displayed.
pub const DISPLAY_PRECISION: usize = 4;

/// A geographic coordinate with latitude and longitude.
///
/// Values are fixed at construction. Use [`Coordinate::try_new`] or
/// [`Coordinate::parse_manual`] for untrusted input; [`Coordinate::new`]
/// trusts its arguments and is meant for device and map sources.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without range checks.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        Axis::Latitude.check(latitude)?;
        Axis::Longitude.check(longitude)?;
        Ok(Self::new(latitude, longitude))
    }

    /// Parses the two text fields of a manual-entry form.
    ///
    /// Both fields are trimmed; empty, unparsable, non-finite and
    /// out-of-range values are rejected. Latitude is checked first.
    pub fn parse_manual(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_degrees(Axis::Latitude, latitude)?;
        let lon = parse_degrees(Axis::Longitude, longitude)?;
        Ok(Self::new(lat, lon))
    }

    /// Latitude in degrees.
    #[inline]
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[inline]
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns true if both components are finite and within range.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Axis::Latitude.check(self.latitude).is_ok() && Axis::Longitude.check(self.longitude).is_ok()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Formats as `"<lat>, <lon>"` with [`DISPLAY_PRECISION`] decimals.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            format_degrees(self.latitude),
            format_degrees(self.longitude)
        )
    }
}
