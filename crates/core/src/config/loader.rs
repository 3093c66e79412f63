//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use crate::validation::Validator;
use std::path::Path;

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// Without an explicit path the standard locations are searched; when
    /// none exists the defaults are used.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self {
            schema: toml::from_str(content)?,
            path: None,
        })
    }

    /// Check cross-field constraints the schema cannot express
    pub fn validate(&self) -> Result<()> {
        let map = &self.schema.map;
        let max_zoom = map.max_zoom;

        Validator::new()
            .required("map.container_id", &map.container_id)
            .required("map.tile_url", &map.tile_url)
            .coordinate("map.default_center", map.default_latitude, map.default_longitude)
            .range("map.default_zoom", map.default_zoom, 0, max_zoom)
            .range("map.startup_zoom", map.startup_zoom, 0, max_zoom)
            .range("map.manual_zoom", map.manual_zoom, 0, max_zoom)
            .range("map.report_zoom", map.report_zoom, 0, max_zoom)
            .range("geolocation.timeout_ms", self.schema.geolocation.timeout_ms, 1, u64::MAX)
            .warn_if(
                "submission.notice_ms",
                self.schema.submission.notice_ms == 0,
                "Notices will disappear immediately",
            )
            .validate()
            .to_result()
            .map_err(|e| Error::new(ErrorCode::ConfigValidationError, e.message))
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [".fixmap.toml", "fixmap.toml", ".config/fixmap.toml"];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config_not_found(path)
        } else {
            Error::config(format!("Failed to read config file {path}: {e}"))
        }
    })?;

    toml::from_str(&content)
        .map_err(|e| Error::new(ErrorCode::ConfigParseError, format!("Failed to parse config file {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.map.default_zoom, 13);
        assert_eq!(config.schema.geolocation.timeout_ms, 10_000);
        assert_eq!(config.schema.submission.notice_ms, 3_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[map]\ndefault_latitude = 52.52\ndefault_longitude = 13.405\n\n[submission]\nsimulated_delay_ms = 0"
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let config = Config::load(Some(path)).unwrap();

        assert_eq!(config.path.as_deref(), Some(path));
        assert_eq!(config.schema.map.default_latitude, 52.52);
        assert_eq!(config.schema.map.report_zoom, 16);
        assert_eq!(config.schema.submission.simulated_delay_ms, 0);
        assert_eq!(config.schema.submission.notice_ms, 3_000);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some("/definitely/not/here/fixmap.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Config::from_toml_str("[map\ndefault_zoom = 3").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_validate_rejects_bad_center_and_zoom() {
        let config =
            Config::from_toml_str("[map]\ndefault_latitude = 95.0\nreport_zoom = 25").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("map.default_center"));
        assert!(err.message.contains("map.report_zoom"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config::from_toml_str("[geolocation]\ntimeout_ms = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
