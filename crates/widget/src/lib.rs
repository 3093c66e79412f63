//! Browser-resident issue-reporting widget.
//!
//! The user stages a location (device geolocation, a pin on the map, or
//! manual latitude/longitude), picks a category and submits. Submitted
//! reports live for the session only and are shown both as a list and as
//! map markers.
//!
//! The browser is reached through four seams so the whole widget runs
//! natively under test:
//! - [`GeolocationProvider`] for `navigator.geolocation`
//! - [`MapWidget`] for the Leaflet map
//! - [`Clock`] for timestamps and delays
//! - [`ReportGateway`] for the (currently simulated) submission round-trip
//!
//! [`FormController`] owns all session state and is the only entry point
//! hosts need. With the `wasm` feature, [`wasm::ReporterApp`] wires it to
//! the real browser APIs.
//!
//! # Example
//!
//! ```ignore
//! let mut app = FormController::new(&config, geolocation, map, clock, gateway)?;
//! app.set_category("pothole")?;
//! app.select_method(LocationMethod::Manual)?;
//! app.set_manual_latitude("8.36")?;
//! app.set_manual_longitude("124.86")?;
//! let id = app.submit().await?;
//! ```

pub mod category;
pub mod clock;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod location;
pub mod map;
pub mod method;
pub mod render;
pub mod report;
pub mod state;
pub mod view;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use category::Category;
pub use clock::{Clock, SystemClock};
pub use controller::{FormController, PendingSubmission};
pub use error::{
    LocationError, MapInitError, RenderError, SubmissionError, ValidationError, WidgetError,
    WidgetResult,
};
pub use fixmap_geo::Coordinate;
pub use gateway::{ReportGateway, SimulatedGateway};
pub use location::{GeolocationProvider, LocationAcquirer, LocationTicket, PositionError, PositionOptions};
pub use map::{MapAdapter, MapArea, MapWidget};
pub use method::{LocationMethod, MethodSelector, PanelVisibility};
pub use render::{MarkerView, RenderedReports, Renderer, ReportCard, ReportListView};
pub use report::{Report, ReportId, ReportStore};
pub use state::{AppState, Notice, NoticeId, Tone};
pub use view::AppView;

/// Installs the global `tracing` subscriber from the `[telemetry]` settings.
///
/// `RUST_LOG` still takes precedence. Browser hosts bring their own
/// subscriber.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(config: &fixmap_core::config::ConfigSchema) -> WidgetResult<()> {
    let telemetry = fixmap_telemetry::TelemetryConfig {
        json: config.telemetry.json,
        ..fixmap_telemetry::TelemetryConfig::with_level(&config.telemetry.log_level)
    };
    fixmap_telemetry::init_with_config(telemetry).map_err(|e| {
        WidgetError::Config(fixmap_core::Error::new(fixmap_core::ErrorCode::Internal, e.to_string()))
    })
}
