//! The form controller: every user interaction goes through here.
//!
//! Operations with a suspension point come in two shapes. The `async`
//! methods (`acquire_device_location`, `submit`, `recenter_on_device`) hold
//! `&mut self` for the whole operation, which is what native hosts and
//! tests want. The split `begin_*` / `complete_*` / `finish_*` pairs let a
//! host that shares the controller (the wasm bridge keeps it in a
//! `RefCell`) release it while the host future is pending and keep
//! handling events in the meantime.

use crate::category::Category;
use crate::clock::{deadline, Clock};
use crate::error::{LocationError, RenderError, SubmissionError, ValidationError, WidgetError};
use crate::gateway::ReportGateway;
use crate::location::{GeolocationProvider, LocationAcquirer, LocationTicket, PositionOptions};
use crate::map::{MapArea, MapWidget};
use crate::method::LocationMethod;
use crate::render::{RenderedReports, Renderer};
use crate::report::{Report, ReportId, ReportStore};
use crate::state::{
    AppState, FormFields, LocationStatus, Notice, NoticeId, Tone, SUBMITTING_LABEL, SUBMIT_LABEL,
};
use crate::view::AppView;
use fixmap_core::config::ConfigSchema;
use fixmap_core::validation::Validator;
use fixmap_geo::Coordinate;
use fixmap_telemetry::{metrics, names, Event};
use tracing::{debug, info, warn};

/// Status text while a device location request is pending.
pub const LOCATING: &str = "Locating…";

/// Notice after a report was stored.
pub const SUBMIT_SUCCEEDED: &str = "Report submitted successfully!";

/// Notice after the gateway or renderer failed.
pub const SUBMIT_FAILED: &str = "Failed to submit report. Please try again.";

/// A validated report waiting for the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    report: Report,
}

impl PendingSubmission {
    /// The report to hand to [`ReportGateway::submit`].
    pub fn report(&self) -> &Report {
        &self.report
    }
}

/// Owns the session state and the host seams.
pub struct FormController<G, W: MapWidget, C, S> {
    state: AppState,
    acquirer: LocationAcquirer<G>,
    map: MapArea<W>,
    renderer: Renderer,
    clock: C,
    gateway: S,
    config: ConfigSchema,
}

impl<G, W, C, S> FormController<G, W, C, S>
where
    G: GeolocationProvider,
    W: MapWidget,
    C: Clock,
    S: ReportGateway,
{
    /// Brings up the map and renders the empty report list.
    ///
    /// A map that fails to initialise leaves the controller usable with the
    /// map area degraded; only template compilation errors are returned.
    pub fn new(
        config: &ConfigSchema,
        geolocation: G,
        widget: W,
        clock: C,
        gateway: S,
    ) -> Result<Self, WidgetError> {
        let renderer = Renderer::new()?;
        let map = MapArea::init(widget, &config.map);
        let acquirer = LocationAcquirer::new(geolocation, PositionOptions::from(&config.geolocation));

        let mut controller = Self {
            state: AppState::default(),
            acquirer,
            map,
            renderer,
            clock,
            gateway,
            config: config.clone(),
        };
        controller.rerender()?;
        controller.reset_location();

        info!(
            session_id = %fixmap_telemetry::session_id(),
            map_ready = controller.map.is_ready(),
            "Report widget ready"
        );
        Ok(controller)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn map(&self) -> &MapArea<W> {
        &self.map
    }

    pub fn acquirer(&self) -> &LocationAcquirer<G> {
        &self.acquirer
    }

    pub fn gateway(&self) -> &S {
        &self.gateway
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &ConfigSchema {
        &self.config
    }

    /// Snapshot of the page as of now.
    pub fn view(&self) -> AppView {
        AppView::capture(&self.state, &self.map, self.clock.now())
    }

    /// Applies the category select. `""` clears the selection.
    pub fn set_category(&mut self, value: &str) -> Result<Option<Category>, ValidationError> {
        let result = Category::parse_selection(value);
        match &result {
            Ok(category) => self.state.form.category = *category,
            Err(err) => {
                debug!(value, "Rejected category");
                self.state.form.category = None;
                self.show_notice(err.to_string(), Tone::Error);
            }
        }
        self.state.refresh_submit();
        result
    }

    pub fn set_description(&mut self, text: &str) {
        self.state.form.description = text.to_string();
        self.state.refresh_submit();
    }

    /// Switches the location method and resets everything location-related.
    ///
    /// Re-selecting the active method performs the same reset. Selecting
    /// [`LocationMethod::MapPin`] while the map is degraded is refused and
    /// leaves the state untouched apart from the status line.
    pub fn select_method(&mut self, method: LocationMethod) -> Result<LocationMethod, ValidationError> {
        if let Err(err) = self.state.method.select(method, self.map.is_ready()) {
            warn!(method = method.as_str(), "Location method refused: map unavailable");
            self.state.location_status = LocationStatus::new(err.to_string(), Tone::Error);
            return Err(err);
        }

        self.reset_location();
        debug!(method = method.as_str(), "Location method selected");
        Ok(method)
    }

    /// Updates the manual latitude field and re-validates the pair.
    pub fn set_manual_latitude(&mut self, text: &str) -> Result<Option<Coordinate>, ValidationError> {
        self.state.method.require(LocationMethod::Manual)?;
        self.state.form.manual_latitude = text.to_string();
        self.apply_manual_entry()
    }

    /// Updates the manual longitude field and re-validates the pair.
    pub fn set_manual_longitude(&mut self, text: &str) -> Result<Option<Coordinate>, ValidationError> {
        self.state.method.require(LocationMethod::Manual)?;
        self.state.form.manual_longitude = text.to_string();
        self.apply_manual_entry()
    }

    fn apply_manual_entry(&mut self) -> Result<Option<Coordinate>, ValidationError> {
        let form = &self.state.form;
        if form.manual_latitude.trim().is_empty() && form.manual_longitude.trim().is_empty() {
            self.state.pending = None;
            self.state.location_status = LocationStatus::default();
            self.state.refresh_submit();
            return Ok(None);
        }

        let parsed = Coordinate::parse_manual(&form.manual_latitude, &form.manual_longitude);
        let result = match parsed {
            Ok(coordinate) => {
                self.state.stage(coordinate);
                self.state.location_status =
                    LocationStatus::new(format!("Set: {coordinate}"), Tone::Success);
                let zoom = self.config.map.manual_zoom;
                if let Some(adapter) = self.map.adapter_mut() {
                    adapter.fly_to(coordinate, zoom);
                }
                Ok(Some(coordinate))
            }
            Err(err) => {
                debug!(error = %err, "Manual coordinates rejected");
                self.state.pending = None;
                let err = ValidationError::InvalidCoordinate(err);
                self.state.location_status = LocationStatus::new(err.to_string(), Tone::Error);
                Err(err)
            }
        };
        self.state.refresh_submit();
        result
    }

    /// Stages a clicked map point. Returns false when the click is ignored.
    pub fn handle_map_click(&mut self, at: Coordinate) -> bool {
        if self.state.method() != LocationMethod::MapPin {
            return false;
        }
        let Some(adapter) = self.map.adapter_mut() else {
            return false;
        };

        adapter.place_pin(at);
        self.state.stage(at);
        self.state.location_status = LocationStatus::new(format!("Pinned: {at}"), Tone::Success);
        self.state.refresh_submit();
        metrics().increment(names::MAP_CLICKS);
        true
    }

    /// Starts a device location request, superseding any in flight.
    pub fn begin_location_request(&mut self) -> Result<LocationTicket, ValidationError> {
        self.state.method.require(LocationMethod::Auto)?;

        let ticket = self.acquirer.begin();
        if let Some(adapter) = self.map.adapter_mut() {
            adapter.clear_pin();
        }
        self.state.pending = None;
        self.state.location_status = LocationStatus::new(LOCATING, Tone::Busy);
        self.state.refresh_submit();
        Ok(ticket)
    }

    /// Applies the outcome of the request `ticket` was issued for.
    ///
    /// Returns false, changing nothing, when the ticket is no longer current.
    pub fn complete_location_request(
        &mut self,
        ticket: LocationTicket,
        result: Result<Coordinate, LocationError>,
    ) -> bool {
        if !self.acquirer.settle(ticket) {
            debug!(?ticket, "Discarding stale location result");
            metrics().increment(names::LOCATION_STALE);
            return false;
        }

        match result {
            Ok(coordinate) => {
                self.state.stage(coordinate);
                self.state.location_status =
                    LocationStatus::new(format!("Location Acquired: {coordinate}"), Tone::Success);
                metrics().increment(names::LOCATION_ACQUIRED);
                info!(%coordinate, "Device location acquired");
            }
            Err(err) => {
                self.state.pending = None;
                self.state.location_status = LocationStatus::new(err.to_string(), Tone::Error);
                metrics().increment(names::LOCATION_FAILED);
                warn!(error = %err, "Device location failed");
            }
        }
        self.state.refresh_submit();
        true
    }

    /// Requests the device location and stages it.
    pub async fn acquire_device_location(&mut self) -> Result<Coordinate, WidgetError> {
        let ticket = self.begin_location_request()?;
        let result = self.acquirer.acquire().await;
        self.complete_location_request(ticket, result);
        Ok(result?)
    }

    /// Centres the map on a startup fix; failures are logged only.
    pub fn apply_startup_location(&mut self, result: Result<Coordinate, LocationError>) -> bool {
        let zoom = self.config.map.startup_zoom;
        let Some(adapter) = self.map.adapter_mut() else {
            return false;
        };
        match result {
            Ok(coordinate) => {
                adapter.set_view(coordinate, zoom);
                info!(%coordinate, zoom, "Map centred on device location");
                true
            }
            Err(err) => {
                warn!(error = %err, "Could not centre map on device location; keeping default view");
                false
            }
        }
    }

    /// Best-effort re-centre on the device, used once at startup.
    pub async fn recenter_on_device(&mut self) -> bool {
        if !self.map.is_ready() {
            return false;
        }
        let result = self.acquirer.acquire().await;
        self.apply_startup_location(result)
    }

    /// Validates the form and marks the controller busy.
    ///
    /// An incomplete form shows an error notice. Any location request still
    /// in flight is invalidated.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, ValidationError> {
        if self.state.submit.busy {
            return Err(ValidationError::SubmissionInProgress);
        }

        let (category, pending) = match (self.state.form.category, self.state.pending) {
            (Some(category), Some(pending)) => (category, pending),
            (category, pending) => {
                let missing = Validator::new()
                    .present("category", category.as_ref())
                    .present("location", pending.as_ref())
                    .validate()
                    .failed_fields();
                let err = ValidationError::Incomplete { missing };
                debug!(error = ?err, "Submission blocked");
                self.show_notice(err.to_string(), Tone::Error);
                return Err(err);
            }
        };

        self.state.submit.busy = true;
        self.state.submit.label = SUBMITTING_LABEL;
        self.state.refresh_submit();
        self.acquirer.invalidate();

        let report = Report::new(
            self.state.store.next_id(),
            category,
            &self.state.form.description,
            pending.coordinate,
            self.clock.now(),
        );
        info!(
            report_id = %report.id(),
            category = category.as_str(),
            method = pending.method.as_str(),
            "Submitting report"
        );
        Ok(PendingSubmission { report })
    }

    /// Commits or rejects `pending` given the gateway outcome.
    ///
    /// The store only changes when the gateway succeeded and the new list
    /// rendered. Busy state is cleared either way.
    pub fn finish_submission(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<(), SubmissionError>,
    ) -> Result<ReportId, SubmissionError> {
        let report = pending.report;
        let id = report.id();
        let category = report.category();
        let location = report.location();
        let now = self.clock.now();

        let committed = outcome.and_then(|()| -> Result<_, SubmissionError> {
            let mut candidate = self.state.store.clone();
            candidate.add(report);
            let rendered = self.renderer.render(&candidate, now)?;
            Ok((candidate, rendered))
        });

        let result = match committed {
            Ok((store, rendered)) => {
                self.commit(store, rendered);
                if let Some(adapter) = self.map.adapter_mut() {
                    adapter.fly_to(location, self.config.map.report_zoom);
                    adapter.clear_pin();
                }
                self.show_notice(SUBMIT_SUCCEEDED, Tone::Success);
                self.state.form = FormFields::default();
                self.state.method.reset();
                self.reset_location();

                metrics().increment(names::REPORTS_SUBMITTED);
                Event::new(
                    "report_submitted",
                    now,
                    serde_json::json!({
                        "id": id.get(),
                        "category": category.as_str(),
                        "latitude": location.latitude(),
                        "longitude": location.longitude(),
                    }),
                )
                .log();
                Ok(id)
            }
            Err(err) => {
                warn!(report_id = %id, error = %err, "Report submission failed");
                metrics().increment(names::REPORTS_FAILED);
                self.show_notice(SUBMIT_FAILED, Tone::Error);
                Err(err)
            }
        };

        self.state.submit.busy = false;
        self.state.submit.label = SUBMIT_LABEL;
        self.state.refresh_submit();
        result
    }

    /// Validates, sends and stores the current form.
    pub async fn submit(&mut self) -> Result<ReportId, WidgetError> {
        let pending = self.begin_submission()?;
        let outcome = self.gateway.submit(pending.report()).await;
        Ok(self.finish_submission(pending, outcome)?)
    }

    /// Replaces the message area; the notice expires after the configured duration.
    pub fn show_notice(&mut self, text: impl Into<String>, tone: Tone) -> NoticeId {
        let id = self.state.next_notice_id();
        let expires_at = deadline(self.clock.now(), self.config.submission.notice_duration());
        self.state.notice = Some(Notice {
            id,
            text: text.into(),
            tone,
            expires_at,
        });
        id
    }

    /// Clears the notice `id` if it is still the one displayed.
    pub fn clear_notice(&mut self, id: NoticeId) -> bool {
        if self.state.notice.as_ref().is_some_and(|n| n.id == id) {
            self.state.notice = None;
            true
        } else {
            false
        }
    }

    /// Re-renders the list and markers, refreshing relative timestamps.
    pub fn rerender(&mut self) -> Result<(), RenderError> {
        let rendered = self.renderer.render(&self.state.store, self.clock.now())?;
        let store = self.state.store.clone();
        self.commit(store, rendered);
        Ok(())
    }

    fn commit(&mut self, store: ReportStore, rendered: RenderedReports) {
        metrics().gauge(names::REPORTS_COUNT, store.len() as u64);
        self.state.store = store;
        self.state.list = rendered.list;
        if let Some(adapter) = self.map.adapter_mut() {
            adapter.replace_report_markers(&rendered.markers);
        }
    }

    /// The reset shared by every method selection.
    fn reset_location(&mut self) {
        self.acquirer.invalidate();
        self.state.pending = None;
        if let Some(adapter) = self.map.adapter_mut() {
            adapter.clear_pin();
        }
        self.state.form.manual_latitude.clear();
        self.state.form.manual_longitude.clear();
        self.state.location_status = LocationStatus::default();
        self.state.refresh_submit();
    }
}
