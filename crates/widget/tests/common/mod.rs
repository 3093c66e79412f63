//! Fakes for the host seams shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use fixmap_core::config::ConfigSchema;
use fixmap_widget::{
    Clock, Coordinate, FormController, GeolocationProvider, MapInitError, MapWidget,
    PositionError, PositionOptions, Report, ReportGateway, SimulatedGateway, SubmissionError,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Initialisation step a [`RecordingMap`] should fail at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    CreateMap,
    TileLayer,
    LayerGroup,
}

/// Map widget that records every call.
#[derive(Debug, Default)]
pub struct RecordingMap {
    pub fail_at: Option<InitStep>,
    next_marker: u32,
    /// Markers currently on the map outside the report layer
    pub pins: Vec<(u32, Coordinate)>,
    /// Markers currently in the report layer, in insertion order
    pub layer: Vec<Coordinate>,
    pub set_views: Vec<(Coordinate, u8)>,
    pub fly_tos: Vec<(Coordinate, u8)>,
}

impl RecordingMap {
    pub fn failing_at(step: InitStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    fn step(&self, step: InitStep) -> Result<(), String> {
        if self.fail_at == Some(step) {
            Err("L is not defined".to_string())
        } else {
            Ok(())
        }
    }
}

impl MapWidget for RecordingMap {
    type Marker = u32;
    type Layer = ();

    fn create_map(&mut self, _container_id: &str, center: Coordinate, zoom: u8) -> Result<(), MapInitError> {
        self.step(InitStep::CreateMap).map_err(MapInitError::CreateMap)?;
        self.set_views.push((center, zoom));
        Ok(())
    }

    fn add_tile_layer(&mut self, _url: &str, _attribution: &str, _max_zoom: u8) -> Result<(), MapInitError> {
        self.step(InitStep::TileLayer).map_err(MapInitError::TileLayer)
    }

    fn create_layer_group(&mut self) -> Result<(), MapInitError> {
        self.step(InitStep::LayerGroup).map_err(MapInitError::LayerGroup)
    }

    fn place_marker(&mut self, at: Coordinate, _popup_html: &str, _open_popup: bool) -> u32 {
        self.next_marker += 1;
        self.pins.push((self.next_marker, at));
        self.next_marker
    }

    fn remove_marker(&mut self, marker: u32) {
        self.pins.retain(|(id, _)| *id != marker);
    }

    fn add_to_layer(&mut self, _layer: &(), at: Coordinate, _popup_html: &str) {
        self.layer.push(at);
    }

    fn clear_layer(&mut self, _layer: &()) {
        self.layer.clear();
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.set_views.push((center, zoom));
    }

    fn fly_to(&mut self, center: Coordinate, zoom: u8) {
        self.fly_tos.push((center, zoom));
    }
}

/// Geolocation that answers from a script, one entry per request.
///
/// An exhausted script answers "position unavailable".
#[derive(Debug, Clone, Default)]
pub struct ScriptedGeolocation {
    answers: Rc<RefCell<VecDeque<Result<Coordinate, PositionError>>>>,
    unsupported: bool,
    requests: Rc<Cell<usize>>,
}

impl ScriptedGeolocation {
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    pub fn push_fix(&self, latitude: f64, longitude: f64) {
        self.answers
            .borrow_mut()
            .push_back(Ok(Coordinate::new(latitude, longitude)));
    }

    pub fn push_error(&self, code: u16) {
        self.answers
            .borrow_mut()
            .push_back(Err(PositionError::new(code, "scripted")));
    }

    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl GeolocationProvider for ScriptedGeolocation {
    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    async fn request_current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, PositionError> {
        self.requests.set(self.requests.get() + 1);
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(PositionError::new(2, "script exhausted")))
    }
}

/// Clock that only moves when told to; sleeping advances it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at(1_700_000_000)
    }
}

impl ManualClock {
    pub fn at(unix_seconds: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(
                DateTime::<Utc>::from_timestamp(unix_seconds, 0).expect("valid timestamp"),
            )),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).expect("duration in range");
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Gateway that rejects every report.
#[derive(Debug, Clone, Default)]
pub struct FailingGateway {
    attempts: Rc<Cell<usize>>,
}

impl FailingGateway {
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl ReportGateway for FailingGateway {
    async fn submit(&self, _report: &Report) -> Result<(), SubmissionError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(SubmissionError::Gateway("connection reset".to_string()))
    }
}

pub type TestController<S = SimulatedGateway<ManualClock>> =
    FormController<ScriptedGeolocation, RecordingMap, ManualClock, S>;

/// Handles kept by a test after the controller took ownership of the fakes.
pub struct Harness<S = SimulatedGateway<ManualClock>> {
    pub app: TestController<S>,
    pub geo: ScriptedGeolocation,
    pub clock: ManualClock,
}

/// Controller with a working map and the simulated gateway.
pub fn harness() -> Harness {
    harness_with(ScriptedGeolocation::default(), RecordingMap::default(), |clock| {
        SimulatedGateway::new(clock, Duration::from_millis(500))
    })
}

/// Controller whose map fails to initialise.
pub fn degraded_harness() -> Harness {
    harness_with(
        ScriptedGeolocation::default(),
        RecordingMap::failing_at(InitStep::TileLayer),
        |clock| SimulatedGateway::new(clock, Duration::from_millis(500)),
    )
}

/// Controller whose gateway always fails.
pub fn failing_harness() -> Harness<FailingGateway> {
    harness_with(ScriptedGeolocation::default(), RecordingMap::default(), |_| {
        FailingGateway::default()
    })
}

pub fn harness_with<S: ReportGateway>(
    geo: ScriptedGeolocation,
    map: RecordingMap,
    gateway: impl FnOnce(ManualClock) -> S,
) -> Harness<S> {
    let clock = ManualClock::default();
    let app = FormController::new(
        &ConfigSchema::default(),
        geo.clone(),
        map,
        clock.clone(),
        gateway(clock.clone()),
    )
    .expect("controller");
    Harness { app, geo, clock }
}

/// The recording map behind a ready controller.
pub fn map_of<S: ReportGateway>(app: &TestController<S>) -> &RecordingMap {
    app.map().adapter().expect("map ready").widget()
}
