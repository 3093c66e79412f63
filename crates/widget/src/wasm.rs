//! WASM bindings: the widget wired to Leaflet and the browser APIs.
//!
//! JavaScript owns the DOM. It forwards input events to [`ReporterApp`] and
//! re-renders from the JSON [`AppView`](crate::view::AppView) passed to the
//! `on_change` callback after every state change.
//!
//! The controller lives in an `Rc<RefCell<_>>`. Borrows are never held
//! across an `.await`: asynchronous work uses the split begin/complete
//! operations with cloned host handles in between.

use crate::clock::Clock;
use crate::controller::FormController;
use crate::error::{MapInitError, WidgetError};
use crate::gateway::{ReportGateway, SimulatedGateway};
use crate::location::{GeolocationProvider, PositionError, PositionOptions};
use crate::map::MapWidget;
use crate::method::LocationMethod;
use crate::state::NoticeId;
use chrono::{DateTime, Utc};
use fixmap_core::config::Config;
use fixmap_core::{Error as CoreError, ResultExt};
use fixmap_geo::Coordinate;
use js_sys::{Array, Function, Object, Promise, Reflect};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

#[wasm_bindgen]
extern "C" {
    /// `L.Map`
    #[derive(Debug, Clone)]
    pub type LeafletHandle;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn leaflet_map(container_id: &str) -> Result<LeafletHandle, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletHandle, center: &Array, zoom: u8) -> LeafletHandle;

    #[wasm_bindgen(method, js_name = flyTo)]
    fn fly_to(this: &LeafletHandle, center: &Array, zoom: u8) -> LeafletHandle;

    #[wasm_bindgen(method)]
    fn on(this: &LeafletHandle, event: &str, handler: &Function) -> LeafletHandle;

    /// `L.TileLayer`
    #[derive(Debug, Clone)]
    pub type TileLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    fn leaflet_tile_layer(url_template: &str, options: &Object) -> Result<TileLayer, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &TileLayer, map: &LeafletHandle) -> TileLayer;

    /// `L.LayerGroup`
    #[derive(Debug, Clone)]
    pub type LayerGroup;

    #[wasm_bindgen(catch, js_namespace = L, js_name = layerGroup)]
    fn leaflet_layer_group() -> Result<LayerGroup, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LayerGroup, map: &LeafletHandle) -> LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &LayerGroup, marker: &Marker) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    fn clear_layers(this: &LayerGroup) -> LayerGroup;

    /// `L.Marker`
    #[derive(Debug, Clone)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn leaflet_marker(at: &Array) -> Marker;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Marker, map: &LeafletHandle) -> Marker;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Marker, html: &str) -> Marker;

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &Marker) -> Marker;

    #[wasm_bindgen(method)]
    fn remove(this: &Marker) -> Marker;

    /// `L.LatLng`
    pub type LatLng;

    #[wasm_bindgen(method)]
    fn wrap(this: &LatLng) -> LatLng;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &LatLng) -> f64;

    /// `L.LeafletMouseEvent`
    pub type MapClick;

    #[wasm_bindgen(method, getter)]
    fn latlng(this: &MapClick) -> LatLng;
}

fn lat_lng(at: Coordinate) -> Array {
    Array::of2(&at.latitude().into(), &at.longitude().into())
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

/// [`MapWidget`] over the global Leaflet `L` object.
#[derive(Debug, Default)]
pub struct LeafletMap {
    map: Option<LeafletHandle>,
}

impl LeafletMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying `L.Map`, once created.
    pub fn handle(&self) -> Option<&LeafletHandle> {
        self.map.as_ref()
    }

    fn require(&self, err: fn(String) -> MapInitError) -> Result<&LeafletHandle, MapInitError> {
        self.map
            .as_ref()
            .ok_or_else(|| err("map has not been created".to_string()))
    }
}

impl MapWidget for LeafletMap {
    type Marker = Marker;
    type Layer = LayerGroup;

    fn create_map(&mut self, container_id: &str, center: Coordinate, zoom: u8) -> Result<(), MapInitError> {
        let map = leaflet_map(container_id).map_err(|e| MapInitError::CreateMap(describe(&e)))?;
        map.set_view(&lat_lng(center), zoom);
        self.map = Some(map);
        Ok(())
    }

    fn add_tile_layer(&mut self, url_template: &str, attribution: &str, max_zoom: u8) -> Result<(), MapInitError> {
        let map = self.require(MapInitError::TileLayer)?;
        let options = Object::new();
        Reflect::set(&options, &"attribution".into(), &attribution.into())
            .and_then(|_| Reflect::set(&options, &"maxZoom".into(), &max_zoom.into()))
            .map_err(|e| MapInitError::TileLayer(describe(&e)))?;
        let tiles = leaflet_tile_layer(url_template, &options)
            .map_err(|e| MapInitError::TileLayer(describe(&e)))?;
        tiles.add_to(map);
        Ok(())
    }

    fn create_layer_group(&mut self) -> Result<LayerGroup, MapInitError> {
        let map = self.require(MapInitError::LayerGroup)?;
        let group = leaflet_layer_group().map_err(|e| MapInitError::LayerGroup(describe(&e)))?;
        group.add_to(map);
        Ok(group)
    }

    fn place_marker(&mut self, at: Coordinate, popup_html: &str, open_popup: bool) -> Marker {
        let marker = leaflet_marker(&lat_lng(at));
        if let Some(map) = &self.map {
            marker.add_to(map);
        }
        marker.bind_popup(popup_html);
        if open_popup {
            marker.open_popup();
        }
        marker
    }

    fn remove_marker(&mut self, marker: Marker) {
        marker.remove();
    }

    fn add_to_layer(&mut self, layer: &LayerGroup, at: Coordinate, popup_html: &str) {
        let marker = leaflet_marker(&lat_lng(at));
        marker.bind_popup(popup_html);
        layer.add_layer(&marker);
    }

    fn clear_layer(&mut self, layer: &LayerGroup) {
        layer.clear_layers();
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        if let Some(map) = &self.map {
            map.set_view(&lat_lng(center), zoom);
        }
    }

    fn fly_to(&mut self, center: Coordinate, zoom: u8) {
        if let Some(map) = &self.map {
            map.fly_to(&lat_lng(center), zoom);
        }
    }
}

fn global_property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// `navigator.geolocation`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocation;

impl BrowserGeolocation {
    fn api() -> Option<JsValue> {
        global_property(&js_sys::global(), "navigator").and_then(|n| global_property(&n, "geolocation"))
    }
}

impl GeolocationProvider for BrowserGeolocation {
    fn is_supported(&self) -> bool {
        Self::api().is_some()
    }

    async fn request_current_position(&self, options: &PositionOptions) -> Result<Coordinate, PositionError> {
        let api = Self::api().ok_or_else(|| PositionError::new(2, "navigator.geolocation missing"))?;
        let get_position: Function = Reflect::get(&api, &"getCurrentPosition".into())
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| PositionError::new(2, "getCurrentPosition missing"))?;

        let request = Object::new();
        let fields: [(&str, JsValue); 3] = [
            ("enableHighAccuracy", options.high_accuracy.into()),
            ("timeout", (options.timeout.as_millis() as f64).into()),
            ("maximumAge", (options.maximum_age.as_millis() as f64).into()),
        ];
        for (key, value) in fields {
            Reflect::set(&request, &key.into(), &value)
                .map_err(|e| PositionError::new(2, describe(&e)))?;
        }

        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(err) = get_position.call3(&api, &resolve, &reject, &request) {
                let _ = reject.call1(&JsValue::UNDEFINED, &err);
            }
        });
        let position = JsFuture::from(promise).await.map_err(|err| {
            let code = global_property(&err, "code")
                .and_then(|c| c.as_f64())
                .map_or(2, |c| c as u16);
            PositionError::new(code, describe(&err))
        })?;

        let coords = global_property(&position, "coords")
            .ok_or_else(|| PositionError::new(2, "position without coords"))?;
        let read = |name: &str| {
            global_property(&coords, name)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| PositionError::new(2, format!("position without {name}")))
        };
        Coordinate::try_new(read("latitude")?, read("longitude")?)
            .map_err(|e| PositionError::new(2, e.to_string()))
    }
}

/// `Date.now` and `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }

    async fn sleep(&self, duration: Duration) {
        let Some(set_timeout) = global_property(&js_sys::global(), "setTimeout")
            .and_then(|f| f.dyn_into::<Function>().ok())
        else {
            tracing::warn!("setTimeout unavailable; not sleeping");
            return;
        };
        let millis = duration.as_millis() as f64;
        let promise = Promise::new(&mut |resolve, _reject| {
            let _ = set_timeout.call2(&JsValue::NULL, &resolve, &millis.into());
        });
        let _ = JsFuture::from(promise).await;
    }
}

/// Hands an error to JavaScript as a JSON error report.
fn js_error(err: impl Into<WidgetError>, operation: &str) -> JsValue {
    let report = err.into().report(operation);
    match serde_json::to_string(&report) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&report.message),
    }
}

type BrowserController =
    FormController<BrowserGeolocation, LeafletMap, BrowserClock, SimulatedGateway<BrowserClock>>;

struct Shared {
    controller: RefCell<BrowserController>,
    on_change: RefCell<Option<Function>>,
    expiring: Cell<Option<NoticeId>>,
}

impl Shared {
    /// Pushes the current view to the registered callback.
    fn notify(&self) {
        let json = match self.controller.borrow().view().to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize view");
                return;
            }
        };
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                tracing::warn!(error = %describe(&err), "on_change callback threw");
            }
        }
    }
}

/// Arranges for the current notice to be cleared once it expires.
fn expire_notice(shared: &Rc<Shared>) {
    let (id, wait, clock) = {
        let controller = shared.controller.borrow();
        let Some(notice) = controller.state().notice() else {
            return;
        };
        (notice.id, controller.config().submission.notice_duration(), *controller.clock())
    };
    if shared.expiring.get() == Some(id) {
        return;
    }
    shared.expiring.set(Some(id));

    let shared = Rc::clone(shared);
    spawn_local(async move {
        clock.sleep(wait).await;
        let cleared = shared.controller.borrow_mut().clear_notice(id);
        if cleared {
            shared.notify();
        }
    });
}

/// Moves the map to the device location once it is known. Failures keep
/// the default view.
fn recenter(shared: &Rc<Shared>) {
    let acquirer = {
        let controller = shared.controller.borrow();
        if !controller.map().is_ready() {
            return;
        }
        controller.acquirer().clone()
    };

    let shared = Rc::clone(shared);
    spawn_local(async move {
        let result = acquirer.acquire().await;
        shared.controller.borrow_mut().apply_startup_location(result);
    });
}

/// Browser entry point.
#[wasm_bindgen]
pub struct ReporterApp {
    shared: Rc<Shared>,
    _map_click: Option<Closure<dyn FnMut(MapClick)>>,
}

#[wasm_bindgen]
impl ReporterApp {
    /// Builds the widget from optional TOML configuration text.
    ///
    /// A missing Leaflet or a failing map container degrades the map area;
    /// only invalid configuration is an error. A ready map is re-centred on
    /// the device location in the background.
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> Result<ReporterApp, JsValue> {
        let config = match config_toml.as_deref() {
            Some(text) => Config::from_toml_str(text),
            None => Ok(Config::default()),
        }
        .context("Parsing widget configuration")
        .map_err(|e| js_error(e, "new"))?;
        config
            .validate()
            .context("Validating widget configuration")
            .map_err(|e| js_error(e, "new"))?;

        let schema = config.schema;
        let clock = BrowserClock;
        let gateway = SimulatedGateway::new(clock, schema.submission.simulated_delay());
        let controller = FormController::new(&schema, BrowserGeolocation, LeafletMap::new(), clock, gateway)
            .map_err(|e| js_error(e, "new"))?;

        let handle = controller
            .map()
            .adapter()
            .and_then(|adapter| adapter.widget().handle().cloned());

        let shared = Rc::new(Shared {
            controller: RefCell::new(controller),
            on_change: RefCell::new(None),
            expiring: Cell::new(None),
        });

        let map_click = handle.map(|map| {
            let weak = Rc::downgrade(&shared);
            let closure = Closure::<dyn FnMut(MapClick)>::new(move |event: MapClick| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let at = event.latlng().wrap();
                let Ok(at) = Coordinate::try_new(at.lat(), at.lng()) else {
                    return;
                };
                let placed = shared.controller.borrow_mut().handle_map_click(at);
                if placed {
                    shared.notify();
                }
            });
            map.on("click", closure.as_ref().unchecked_ref());
            closure
        });

        recenter(&shared);

        Ok(ReporterApp {
            shared,
            _map_click: map_click,
        })
    }

    /// Registers the view callback and invokes it once immediately.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        *self.shared.on_change.borrow_mut() = Some(callback);
        self.shared.notify();
    }

    /// Current view as JSON.
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        self.shared
            .controller
            .borrow()
            .view()
            .to_json()
            .map_err(|e| js_error(CoreError::from(e), "viewJson"))
    }

    #[wasm_bindgen(js_name = setCategory)]
    pub fn set_category(&self, value: &str) -> bool {
        let ok = self.shared.controller.borrow_mut().set_category(value).is_ok();
        expire_notice(&self.shared);
        self.shared.notify();
        ok
    }

    #[wasm_bindgen(js_name = setDescription)]
    pub fn set_description(&self, text: &str) {
        self.shared.controller.borrow_mut().set_description(text);
        self.shared.notify();
    }

    /// Selects `"auto"`, `"map"` or `"manual"`.
    #[wasm_bindgen(js_name = selectMethod)]
    pub fn select_method(&self, value: &str) -> Result<bool, JsValue> {
        let method: LocationMethod = value.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let ok = self.shared.controller.borrow_mut().select_method(method).is_ok();
        self.shared.notify();
        Ok(ok)
    }

    #[wasm_bindgen(js_name = setManualLatitude)]
    pub fn set_manual_latitude(&self, text: &str) -> bool {
        let ok = self.shared.controller.borrow_mut().set_manual_latitude(text).is_ok();
        self.shared.notify();
        ok
    }

    #[wasm_bindgen(js_name = setManualLongitude)]
    pub fn set_manual_longitude(&self, text: &str) -> bool {
        let ok = self.shared.controller.borrow_mut().set_manual_longitude(text).is_ok();
        self.shared.notify();
        ok
    }

    /// Starts a device location request; the result arrives via `onChange`.
    #[wasm_bindgen(js_name = requestLocation)]
    pub fn request_location(&self) {
        let started = {
            let mut controller = self.shared.controller.borrow_mut();
            controller
                .begin_location_request()
                .map(|ticket| (ticket, controller.acquirer().clone()))
        };
        self.shared.notify();
        let Ok((ticket, acquirer)) = started else {
            return;
        };

        let shared = Rc::clone(&self.shared);
        spawn_local(async move {
            let result = acquirer.acquire().await;
            shared.controller.borrow_mut().complete_location_request(ticket, result);
            shared.notify();
        });
    }

    /// Best-effort re-centre of the map on the device location.
    #[wasm_bindgen(js_name = recenterOnDevice)]
    pub fn recenter_on_device(&self) {
        recenter(&self.shared);
    }

    /// Validates and submits the form; the outcome arrives via `onChange`.
    pub fn submit(&self) {
        let started = {
            let mut controller = self.shared.controller.borrow_mut();
            controller
                .begin_submission()
                .map(|pending| (pending, controller.gateway().clone()))
        };
        expire_notice(&self.shared);
        self.shared.notify();
        let Ok((pending, gateway)) = started else {
            return;
        };

        let shared = Rc::clone(&self.shared);
        spawn_local(async move {
            let outcome = gateway.submit(pending.report()).await;
            let result = shared.controller.borrow_mut().finish_submission(pending, outcome);
            if let Err(err) = result {
                tracing::debug!(error = %err, "Submission finished with error");
            }
            expire_notice(&shared);
            shared.notify();
        });
    }

    /// Re-renders the list so relative timestamps stay current.
    pub fn refresh(&self) -> Result<(), JsValue> {
        self.shared
            .controller
            .borrow_mut()
            .rerender()
            .map_err(|e| js_error(e, "refresh"))?;
        self.shared.notify();
        Ok(())
    }

    /// Session counters and gauges as JSON.
    #[wasm_bindgen(js_name = metricsJson)]
    pub fn metrics_json(&self) -> String {
        fixmap_telemetry::metrics().export_json().to_string()
    }
}
