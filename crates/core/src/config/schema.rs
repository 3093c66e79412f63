//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Base map and zoom levels
    #[serde(default)]
    pub map: MapConfig,

    /// Device geolocation request options
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Submission round-trip and notice timing
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Base map configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// DOM id of the map container
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// Latitude of the initial map centre
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,

    /// Longitude of the initial map centre
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,

    /// Zoom of the initial view
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,

    /// Zoom used when re-centring on the device at startup
    #[serde(default = "default_startup_zoom")]
    pub startup_zoom: u8,

    /// Zoom used when flying to a manually entered coordinate
    #[serde(default = "default_manual_zoom")]
    pub manual_zoom: u8,

    /// Zoom used when flying to a freshly submitted report
    #[serde(default = "default_report_zoom")]
    pub report_zoom: u8,

    /// Tile URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Tile attribution HTML
    #[serde(default = "default_attribution")]
    pub attribution: String,

    /// Maximum zoom supported by the tile source
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
            default_zoom: default_zoom(),
            startup_zoom: default_startup_zoom(),
            manual_zoom: default_manual_zoom(),
            report_zoom: default_report_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            max_zoom: default_max_zoom(),
        }
    }
}

fn default_container_id() -> String {
    "map".to_string()
}

// Manolo Fortich, Bukidnon
fn default_latitude() -> f64 {
    8.36
}

fn default_longitude() -> f64 {
    124.86
}

fn default_zoom() -> u8 {
    13
}

fn default_startup_zoom() -> u8 {
    14
}

fn default_manual_zoom() -> u8 {
    14
}

fn default_report_zoom() -> u8 {
    16
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
        .to_string()
}

fn default_max_zoom() -> u8 {
    19
}

/// Options passed to the host geolocation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Ask the device for its most accurate fix
    #[serde(default = "default_true")]
    pub high_accuracy: bool,

    /// Upper bound on a single request
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Oldest cached position the host may return; 0 forces a fresh fix
    #[serde(default)]
    pub maximum_age_ms: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: 0,
        }
    }
}

impl GeolocationConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Maximum cached age as a [`Duration`]
    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Submission timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Artificial delay standing in for a network round-trip
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,

    /// How long success and error notices stay visible
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: default_simulated_delay_ms(),
            notice_ms: default_notice_ms(),
        }
    }
}

impl SubmissionConfig {
    /// Simulated round-trip as a [`Duration`]
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    /// Notice lifetime as a [`Duration`]
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}

fn default_simulated_delay_ms() -> u64 {
    500
}

fn default_notice_ms() -> u64 {
    3_000
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
