//! Façade over the external mapping widget.
//!
//! The adapter owns two marker sets: a single transient pin for map-click
//! selection, and a layer group mirroring the report store that is cleared
//! and rebuilt on every store change.

use crate::error::MapInitError;
use crate::render::MarkerView;
use fixmap_core::config::MapConfig;
use fixmap_geo::Coordinate;
use tracing::{info, warn};

/// Popup attached to the transient pin.
pub const PIN_POPUP: &str = "New Issue Location (Temporary)";

/// Shown in place of the map when initialisation failed.
pub const MAP_UNAVAILABLE: &str = "Error: Could not load map.";

/// Operations the widget needs from a slippy-map library.
pub trait MapWidget {
    /// Handle to a marker placed directly on the map
    type Marker;
    /// Handle to a group of markers cleared together
    type Layer;

    fn create_map(&mut self, container_id: &str, center: Coordinate, zoom: u8) -> Result<(), MapInitError>;

    fn add_tile_layer(&mut self, url_template: &str, attribution: &str, max_zoom: u8) -> Result<(), MapInitError>;

    fn create_layer_group(&mut self) -> Result<Self::Layer, MapInitError>;

    /// Places a marker with a popup on the map itself.
    fn place_marker(&mut self, at: Coordinate, popup_html: &str, open_popup: bool) -> Self::Marker;

    fn remove_marker(&mut self, marker: Self::Marker);

    /// Adds a marker with a popup to `layer`.
    fn add_to_layer(&mut self, layer: &Self::Layer, at: Coordinate, popup_html: &str);

    fn clear_layer(&mut self, layer: &Self::Layer);

    /// Jumps to a view without animation.
    fn set_view(&mut self, center: Coordinate, zoom: u8);

    /// Animates to a view.
    fn fly_to(&mut self, center: Coordinate, zoom: u8);
}

/// An initialised map with its marker bookkeeping.
pub struct MapAdapter<W: MapWidget> {
    widget: W,
    reports: W::Layer,
    pin: Option<(W::Marker, Coordinate)>,
    report_markers: usize,
}

impl<W: MapWidget> MapAdapter<W> {
    /// Creates the base map, tile layer and report layer.
    pub fn init(mut widget: W, config: &MapConfig) -> Result<Self, MapInitError> {
        let center = Coordinate::new(config.default_latitude, config.default_longitude);
        widget.create_map(&config.container_id, center, config.default_zoom)?;
        widget.add_tile_layer(&config.tile_url, &config.attribution, config.max_zoom)?;
        let reports = widget.create_layer_group()?;

        info!(container = %config.container_id, %center, zoom = config.default_zoom, "Map initialized");
        Ok(Self {
            widget,
            reports,
            pin: None,
            report_markers: 0,
        })
    }

    /// Puts the transient pin at `at`, replacing any previous pin.
    pub fn place_pin(&mut self, at: Coordinate) {
        self.clear_pin();
        let marker = self.widget.place_marker(at, PIN_POPUP, true);
        self.pin = Some((marker, at));
    }

    /// Removes the transient pin if present.
    pub fn clear_pin(&mut self) {
        if let Some((marker, _)) = self.pin.take() {
            self.widget.remove_marker(marker);
        }
    }

    /// Location of the transient pin.
    pub fn pin(&self) -> Option<Coordinate> {
        self.pin.as_ref().map(|(_, at)| *at)
    }

    /// Rebuilds the report layer from `markers`.
    pub fn replace_report_markers(&mut self, markers: &[MarkerView]) {
        self.widget.clear_layer(&self.reports);
        for marker in markers {
            self.widget.add_to_layer(&self.reports, marker.location, &marker.popup_html);
        }
        self.report_markers = markers.len();
    }

    pub fn report_marker_count(&self) -> usize {
        self.report_markers
    }

    pub fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.widget.set_view(center, zoom);
    }

    pub fn fly_to(&mut self, center: Coordinate, zoom: u8) {
        self.widget.fly_to(center, zoom);
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }
}

/// The map container: working, or degraded with a visible message.
pub enum MapArea<W: MapWidget> {
    Ready(MapAdapter<W>),
    Degraded { reason: String },
}

impl<W: MapWidget> MapArea<W> {
    /// Initialises the map; failures degrade instead of propagating.
    pub fn init(widget: W, config: &MapConfig) -> Self {
        match MapAdapter::init(widget, config) {
            Ok(adapter) => MapArea::Ready(adapter),
            Err(err) => {
                warn!(error = %err, "Map initialization failed; map features disabled");
                MapArea::Degraded {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, MapArea::Ready(_))
    }

    pub fn adapter(&self) -> Option<&MapAdapter<W>> {
        match self {
            MapArea::Ready(adapter) => Some(adapter),
            MapArea::Degraded { .. } => None,
        }
    }

    pub fn adapter_mut(&mut self) -> Option<&mut MapAdapter<W>> {
        match self {
            MapArea::Ready(adapter) => Some(adapter),
            MapArea::Degraded { .. } => None,
        }
    }

    /// User-facing message while degraded.
    pub fn message(&self) -> Option<&'static str> {
        (!self.is_ready()).then_some(MAP_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportStore;

    #[derive(Default)]
    struct Recorder {
        fail_tiles: bool,
        placed: u32,
        live_pins: Vec<u32>,
        layer: Vec<Coordinate>,
        views: Vec<(Coordinate, u8)>,
    }

    impl MapWidget for Recorder {
        type Marker = u32;
        type Layer = ();

        fn create_map(&mut self, _: &str, center: Coordinate, zoom: u8) -> Result<(), MapInitError> {
            self.views.push((center, zoom));
            Ok(())
        }

        fn add_tile_layer(&mut self, _: &str, _: &str, _: u8) -> Result<(), MapInitError> {
            if self.fail_tiles {
                Err(MapInitError::TileLayer("offline".into()))
            } else {
                Ok(())
            }
        }

        fn create_layer_group(&mut self) -> Result<(), MapInitError> {
            Ok(())
        }

        fn place_marker(&mut self, _: Coordinate, _: &str, _: bool) -> u32 {
            self.placed += 1;
            self.live_pins.push(self.placed);
            self.placed
        }

        fn remove_marker(&mut self, marker: u32) {
            self.live_pins.retain(|m| *m != marker);
        }

        fn add_to_layer(&mut self, _: &(), at: Coordinate, _: &str) {
            self.layer.push(at);
        }

        fn clear_layer(&mut self, _: &()) {
            self.layer.clear();
        }

        fn set_view(&mut self, center: Coordinate, zoom: u8) {
            self.views.push((center, zoom));
        }

        fn fly_to(&mut self, center: Coordinate, zoom: u8) {
            self.views.push((center, zoom));
        }
    }

    #[test]
    fn test_init_uses_default_center() {
        let adapter = MapAdapter::init(Recorder::default(), &MapConfig::default()).unwrap();
        assert_eq!(adapter.widget().views, vec![(Coordinate::new(8.36, 124.86), 13)]);
    }

    #[test]
    fn test_pin_is_replaced_not_accumulated() {
        let mut adapter = MapAdapter::init(Recorder::default(), &MapConfig::default()).unwrap();
        adapter.place_pin(Coordinate::new(1.0, 1.0));
        adapter.place_pin(Coordinate::new(2.0, 2.0));

        assert_eq!(adapter.widget().live_pins, vec![2]);
        assert_eq!(adapter.pin(), Some(Coordinate::new(2.0, 2.0)));

        adapter.clear_pin();
        assert!(adapter.widget().live_pins.is_empty());
        assert_eq!(adapter.pin(), None);
    }

    #[test]
    fn test_report_markers_are_rebuilt() {
        let mut adapter = MapAdapter::init(Recorder::default(), &MapConfig::default()).unwrap();
        let marker = |lat| MarkerView {
            id: ReportStore::new().next_id(),
            location: Coordinate::new(lat, 0.0),
            popup_html: String::new(),
        };

        adapter.replace_report_markers(&[marker(1.0), marker(2.0)]);
        adapter.replace_report_markers(&[marker(3.0)]);

        assert_eq!(adapter.widget().layer, vec![Coordinate::new(3.0, 0.0)]);
        assert_eq!(adapter.report_marker_count(), 1);
    }

    #[test]
    fn test_failed_init_degrades() {
        let widget = Recorder {
            fail_tiles: true,
            ..Recorder::default()
        };
        let area = MapArea::init(widget, &MapConfig::default());
        assert!(!area.is_ready());
        assert_eq!(area.message(), Some(MAP_UNAVAILABLE));
        assert!(area.adapter().is_none());
    }
}
