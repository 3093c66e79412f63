//! Structured error handling with context and recovery suggestions
//!
//! Every widget failure can be lifted into [`Error`] so a host can log or
//! display one uniform report:
//! - Error codes for programmatic handling
//! - Optional context and recovery suggestion
//! - Serializable error reports

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,

    // Location errors (2xxx)
    LocationError = 2000,
    PermissionDenied = 2001,
    PositionUnavailable = 2002,
    LocationTimeout = 2003,
    GeolocationUnsupported = 2004,

    // Validation errors (3xxx)
    ValidationError = 3000,
    InvalidCoordinate = 3001,
    UnknownCategory = 3002,
    IncompleteForm = 3003,

    // Submission errors (4xxx)
    SubmissionError = 4000,
    GatewayFailed = 4001,
    RenderFailed = 4002,

    // Map errors (5xxx)
    MapError = 5000,
    MapInitFailed = 5001,
    MapUnavailable = 5002,

    // Configuration errors (6xxx)
    ConfigError = 6000,
    ConfigNotFound = 6001,
    ConfigParseError = 6002,
    ConfigValidationError = 6003,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "Location",
            3 => "Validation",
            4 => "Submission",
            5 => "Map",
            6 => "Configuration",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(ToString::to_string),
        }
    }

    // Convenience constructors

    /// Geolocation permission was refused by the user
    pub fn permission_denied() -> Self {
        Self::new(ErrorCode::PermissionDenied, "Location permission denied")
            .with_suggestion("Allow location access in the browser, or pin the location on the map")
    }

    /// Manual coordinate rejected
    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCoordinate, message)
            .with_suggestion("Latitude must be within -90..90 and longitude within -180..180")
    }

    /// Map widget could not be initialized
    pub fn map_init(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MapInitFailed, message)
            .with_suggestion("Use automatic or manual location entry instead")
    }

    /// Generic configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Configuration file missing
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .fixmap.toml file or omit the path to use defaults")
    }
}

/// Serializable error report for logging and host display
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::ConfigNotFound,
            _ => ErrorCode::ConfigError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("JSON error: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

impl From<fixmap_geo::GeoError> for Error {
    fn from(err: fixmap_geo::GeoError) -> Self {
        Error::invalid_coordinate(err.to_string()).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::PermissionDenied.to_string(), "E2001");
        assert_eq!(ErrorCode::MapInitFailed.to_string(), "E5001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::LocationTimeout.category(), "Location");
        assert_eq!(ErrorCode::UnknownCategory.category(), "Validation");
        assert_eq!(ErrorCode::GatewayFailed.category(), "Submission");
        assert_eq!(ErrorCode::ConfigParseError.category(), "Configuration");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::config_not_found("/path/to/fixmap.toml").with_context("While starting");

        assert_eq!(err.code, ErrorCode::ConfigNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_geo_error_conversion() {
        let geo = fixmap_geo::Coordinate::parse_manual("91", "0").unwrap_err();
        let err: Error = geo.into();
        assert_eq!(err.code, ErrorCode::InvalidCoordinate);
        assert!(err.message.contains("latitude"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::new(ErrorCode::GatewayFailed, "gateway unreachable").with_context("During submit");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E4001"));
        assert!(json.contains("Submission"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(Error::new(ErrorCode::IncompleteForm, "bad"));
        let err = result.context("while validating form").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("while validating form"));
    }
}
