//! Error types for the widget.
//!
//! Every variant is recoverable: the controller converts them into
//! user-visible state at the boundary of the operation that failed.

use crate::method::LocationMethod;
use fixmap_core::error::ErrorReport;
use fixmap_core::{Error as CoreError, ErrorCode};
use fixmap_geo::GeoError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for widget operations
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Failure to obtain a device location.
///
/// The `Display` text is shown verbatim in the location status readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    /// The user refused the permission prompt
    #[error("Permission denied. Please enable location.")]
    PermissionDenied,

    /// The device could not determine a position
    #[error("Location unavailable.")]
    PositionUnavailable,

    /// No fix arrived within the request timeout
    #[error("Request timed out.")]
    Timeout,

    /// The host has no geolocation capability
    #[error("Geolocation is not supported by your browser.")]
    Unsupported,
}

impl LocationError {
    /// Maps a host error code (1 = denied, 2 = unavailable, 3 = timeout).
    ///
    /// Unknown codes are reported as an unavailable position.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}

/// Rejected user input. Blocks submission, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Manual latitude/longitude could not be accepted
    #[error("Invalid coordinates.")]
    InvalidCoordinate(#[source] GeoError),

    /// Category value outside the fixed set
    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),

    /// Category or location missing at submit time
    #[error("Please select a category and get location.")]
    Incomplete {
        /// Fields that were missing
        missing: Vec<String>,
    },

    /// A submission is already in flight
    #[error("A report is already being submitted.")]
    SubmissionInProgress,

    /// The input belongs to a location method that is not active
    #[error("{attempted} input is not available while {active} is selected.")]
    WrongMethod {
        /// Method the input belongs to
        attempted: LocationMethod,
        /// Method currently selected
        active: LocationMethod,
    },

    /// The requested method needs a map that failed to load
    #[error("Map is unavailable. Choose another location method.")]
    MethodUnavailable(LocationMethod),
}

/// Failure after a submission passed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    /// The transport rejected or lost the report
    #[error("Report gateway failed: {0}")]
    Gateway(String),

    /// The new report could not be rendered
    #[error("Rendering failed: {0}")]
    Render(String),
}

/// Template registration or rendering failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

impl From<RenderError> for SubmissionError {
    fn from(err: RenderError) -> Self {
        SubmissionError::Render(err.0)
    }
}

/// The map widget could not be brought up.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapInitError {
    /// Base map creation failed
    #[error("Failed to create map: {0}")]
    CreateMap(String),

    /// Tile layer could not be added
    #[error("Failed to add tile layer: {0}")]
    TileLayer(String),

    /// Marker layer group could not be created
    #[error("Failed to create marker layer: {0}")]
    LayerGroup(String),
}

/// Any widget failure.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Device location failure
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Input validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Submission failure
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Map initialisation failure
    #[error(transparent)]
    Map(#[from] MapInitError),

    /// Template failure outside a submission
    #[error("Template error: {0}")]
    Render(#[from] RenderError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] CoreError),
}

impl WidgetError {
    /// Error code in the shared numbering scheme.
    pub fn code(&self) -> ErrorCode {
        match self {
            WidgetError::Location(e) => match e {
                LocationError::PermissionDenied => ErrorCode::PermissionDenied,
                LocationError::PositionUnavailable => ErrorCode::PositionUnavailable,
                LocationError::Timeout => ErrorCode::LocationTimeout,
                LocationError::Unsupported => ErrorCode::GeolocationUnsupported,
            },
            WidgetError::Validation(e) => match e {
                ValidationError::InvalidCoordinate(_) => ErrorCode::InvalidCoordinate,
                ValidationError::UnknownCategory(_) => ErrorCode::UnknownCategory,
                ValidationError::Incomplete { .. } | ValidationError::SubmissionInProgress => {
                    ErrorCode::IncompleteForm
                }
                ValidationError::WrongMethod { .. } => ErrorCode::ValidationError,
                ValidationError::MethodUnavailable(_) => ErrorCode::MapUnavailable,
            },
            WidgetError::Submission(SubmissionError::Gateway(_)) => ErrorCode::GatewayFailed,
            WidgetError::Submission(SubmissionError::Render(_)) | WidgetError::Render(_) => {
                ErrorCode::RenderFailed
            }
            WidgetError::Map(_) => ErrorCode::MapInitFailed,
            WidgetError::Config(e) => e.code,
        }
    }
}

impl WidgetError {
    /// Serializable report for a host.
    ///
    /// The failing operation becomes the context unless the error already
    /// carries one.
    pub fn report(self, operation: &str) -> ErrorReport {
        let err = CoreError::from(self);
        let err = if err.context.is_some() { err } else { err.with_context(operation) };
        err.to_report()
    }
}

impl From<WidgetError> for CoreError {
    fn from(err: WidgetError) -> Self {
        match err {
            WidgetError::Config(inner) => inner,
            WidgetError::Location(LocationError::PermissionDenied) => CoreError::permission_denied(),
            WidgetError::Map(e) => CoreError::map_init(e.to_string()),
            other => CoreError::new(other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_error_from_code() {
        assert_eq!(LocationError::from_code(1), LocationError::PermissionDenied);
        assert_eq!(LocationError::from_code(2), LocationError::PositionUnavailable);
        assert_eq!(LocationError::from_code(3), LocationError::Timeout);
        assert_eq!(LocationError::from_code(42), LocationError::PositionUnavailable);
    }

    #[test]
    fn test_location_messages() {
        assert_eq!(
            LocationError::PermissionDenied.to_string(),
            "Permission denied. Please enable location."
        );
        assert_eq!(LocationError::Timeout.to_string(), "Request timed out.");
    }

    #[test]
    fn test_widget_error_codes() {
        let err = WidgetError::from(LocationError::Timeout);
        assert_eq!(err.code(), ErrorCode::LocationTimeout);

        let err = WidgetError::from(SubmissionError::Gateway("offline".into()));
        assert_eq!(err.code(), ErrorCode::GatewayFailed);

        let err = WidgetError::from(ValidationError::MethodUnavailable(LocationMethod::MapPin));
        assert_eq!(err.code(), ErrorCode::MapUnavailable);
    }

    #[test]
    fn test_conversion_to_core_error() {
        let core: CoreError = WidgetError::from(MapInitError::CreateMap("no L".into())).into();
        assert_eq!(core.code, ErrorCode::MapInitFailed);
        assert!(core.suggestion.is_some());

        let core: CoreError = WidgetError::from(ValidationError::UnknownCategory("x".into())).into();
        assert_eq!(core.code, ErrorCode::UnknownCategory);
    }

    #[test]
    fn test_report_for_host() {
        let report = WidgetError::from(LocationError::PermissionDenied).report("requestLocation");
        assert_eq!(report.code_str, "E2001");
        assert_eq!(report.category, "Location");
        assert_eq!(report.context.as_deref(), Some("requestLocation"));
        assert!(report.suggestion.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], "PERMISSION_DENIED");
    }

    #[test]
    fn test_report_keeps_existing_context() {
        use fixmap_core::ResultExt;

        let parsed = fixmap_core::config::Config::from_toml_str("[map
")
            .context("Parsing widget configuration");
        let report = WidgetError::from(parsed.unwrap_err()).report("new");
        assert_eq!(report.code, ErrorCode::ConfigParseError);
        assert_eq!(report.context.as_deref(), Some("Parsing widget configuration"));
    }
}
