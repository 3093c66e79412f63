//! Serializable snapshot of everything the page shows.
//!
//! Hosts render from an [`AppView`] after every operation instead of poking
//! at controller state. The wasm bridge hands it to JavaScript as JSON.

use crate::category::Category;
use crate::map::{MapArea, MapWidget};
use crate::method::{LocationMethod, PanelVisibility};
use crate::render::ReportListView;
use crate::state::{AppState, LocationStatus, Notice, SubmitControl};
use chrono::{DateTime, Utc};
use fixmap_geo::Coordinate;
use serde::Serialize;

/// One option of the category select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Current values of the form inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub categories: Vec<CategoryOption>,
    pub description: String,
    pub manual_latitude: String,
    pub manual_longitude: String,
}

/// State of the map container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub ready: bool,
    /// Replaces the map while it is degraded
    pub message: Option<&'static str>,
    pub report_markers: usize,
    pub pin: Option<Coordinate>,
}

/// The whole page, as of `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppView {
    pub method: LocationMethod,
    pub panels: PanelVisibility,
    /// False when the map failed to load
    pub map_pin_available: bool,
    pub form: FormView,
    pub location_status: LocationStatus,
    pub pending: Option<Coordinate>,
    pub submit: SubmitControl,
    /// Omitted once expired
    pub notice: Option<Notice>,
    pub reports: ReportListView,
    pub map: MapView,
}

impl AppView {
    /// Snapshot of `state` and `map`; notices past their expiry are dropped.
    pub fn capture<W: MapWidget>(state: &AppState, map: &MapArea<W>, now: DateTime<Utc>) -> Self {
        let method = state.method();
        let form = state.form();

        let categories = Category::ALL
            .into_iter()
            .map(|c| CategoryOption {
                value: c.as_str(),
                label: c.label(),
                selected: form.category == Some(c),
            })
            .collect();

        let map_view = match map.adapter() {
            Some(adapter) => MapView {
                ready: true,
                message: None,
                report_markers: adapter.report_marker_count(),
                pin: adapter.pin(),
            },
            None => MapView {
                ready: false,
                message: map.message(),
                report_markers: 0,
                pin: None,
            },
        };

        Self {
            method,
            panels: method.panels(),
            map_pin_available: map.is_ready(),
            form: FormView {
                categories,
                description: form.description.clone(),
                manual_latitude: form.manual_latitude.clone(),
                manual_longitude: form.manual_longitude.clone(),
            },
            location_status: state.location_status().clone(),
            pending: state.pending(),
            submit: state.submit_control().clone(),
            notice: state.notice().filter(|n| !n.is_expired(now)).cloned(),
            reports: state.report_list().clone(),
            map: map_view,
        }
    }

    /// JSON form handed to JavaScript hosts.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
