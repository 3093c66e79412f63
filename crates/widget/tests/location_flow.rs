mod common;

use common::{harness, harness_with, map_of, RecordingMap, ScriptedGeolocation};
use fixmap_widget::{
    Category, Coordinate, LocationError, LocationMethod, SimulatedGateway, Tone, ValidationError,
    WidgetError,
};
use std::time::Duration;
use tokio_test::block_on;

#[test]
fn device_fix_stages_coordinate() {
    let mut h = harness();
    h.geo.push_fix(8.36, 124.86);

    let coord = block_on(h.app.acquire_device_location()).unwrap();

    assert_eq!(coord, Coordinate::new(8.36, 124.86));
    assert_eq!(h.app.state().pending(), Some(coord));
    let status = h.app.state().location_status();
    assert_eq!(status.text, "Location Acquired: 8.3600, 124.8600");
    assert_eq!(status.tone, Tone::Success);
}

#[test]
fn eligibility_needs_category_and_location() {
    let mut h = harness();
    h.geo.push_fix(8.36, 124.86);
    assert!(!h.app.state().submit_control().enabled);

    h.app.set_category("pothole").unwrap();
    assert!(!h.app.state().submit_control().enabled);

    block_on(h.app.acquire_device_location()).unwrap();
    assert!(h.app.state().submit_control().enabled);

    h.app.set_category("").unwrap();
    assert!(!h.app.state().submit_control().enabled);
}

#[test]
fn every_category_with_a_location_is_eligible() {
    for category in Category::ALL {
        let mut h = harness();
        h.geo.push_fix(1.0, 2.0);
        h.app.set_category(category.as_str()).unwrap();
        block_on(h.app.acquire_device_location()).unwrap();
        assert!(h.app.state().can_submit(), "{category}");
    }
}

#[test]
fn host_errors_are_shown_and_clear_pending() {
    for (code, expected) in [
        (1, "Permission denied. Please enable location."),
        (2, "Location unavailable."),
        (3, "Request timed out."),
    ] {
        let mut h = harness();
        h.geo.push_fix(8.36, 124.86);
        block_on(h.app.acquire_device_location()).unwrap();

        h.geo.push_error(code);
        let err = block_on(h.app.acquire_device_location()).unwrap_err();

        assert!(matches!(err, WidgetError::Location(_)));
        assert_eq!(h.app.state().pending(), None);
        assert_eq!(h.app.state().location_status().text, expected);
        assert_eq!(h.app.state().location_status().tone, Tone::Error);
    }
}

#[test]
fn unsupported_host_is_reported() {
    let geo = ScriptedGeolocation::unsupported();
    let mut h = harness_with(geo.clone(), RecordingMap::default(), |clock| {
        SimulatedGateway::new(clock, Duration::ZERO)
    });

    let err = block_on(h.app.acquire_device_location()).unwrap_err();

    assert!(matches!(err, WidgetError::Location(LocationError::Unsupported)));
    assert_eq!(
        h.app.state().location_status().text,
        "Geolocation is not supported by your browser."
    );
    assert_eq!(geo.requests(), 0);
}

#[test]
fn locating_shows_busy_status_and_removes_pin() {
    let mut h = harness();
    h.app.select_method(LocationMethod::MapPin).unwrap();
    assert!(h.app.handle_map_click(Coordinate::new(8.0, 124.0)));
    h.app.select_method(LocationMethod::Auto).unwrap();

    h.app.begin_location_request().unwrap();

    assert_eq!(h.app.state().location_status().text, "Locating…");
    assert_eq!(h.app.state().location_status().tone, Tone::Busy);
    assert!(map_of(&h.app).pins.is_empty());
}

#[test]
fn location_request_needs_auto_method() {
    let mut h = harness();
    h.app.select_method(LocationMethod::Manual).unwrap();
    assert!(matches!(
        h.app.begin_location_request(),
        Err(ValidationError::WrongMethod { .. })
    ));
    assert_eq!(h.geo.requests(), 0);
}

#[test]
fn older_request_resolving_late_is_ignored() {
    let mut h = harness();
    let first = h.app.begin_location_request().unwrap();
    let second = h.app.begin_location_request().unwrap();

    assert!(h.app.complete_location_request(second, Ok(Coordinate::new(2.0, 2.0))));
    assert!(!h.app.complete_location_request(first, Ok(Coordinate::new(1.0, 1.0))));

    assert_eq!(h.app.state().pending(), Some(Coordinate::new(2.0, 2.0)));
    assert_eq!(h.app.state().location_status().text, "Location Acquired: 2.0000, 2.0000");
}

#[test]
fn late_error_does_not_overwrite_newer_fix() {
    let mut h = harness();
    let first = h.app.begin_location_request().unwrap();
    let second = h.app.begin_location_request().unwrap();

    h.app.complete_location_request(second, Ok(Coordinate::new(2.0, 2.0)));
    h.app.complete_location_request(first, Err(LocationError::Timeout));

    assert_eq!(h.app.state().pending(), Some(Coordinate::new(2.0, 2.0)));
    assert_eq!(h.app.state().location_status().tone, Tone::Success);
}

#[test]
fn result_after_method_switch_is_ignored() {
    let mut h = harness();
    let ticket = h.app.begin_location_request().unwrap();
    h.app.select_method(LocationMethod::Manual).unwrap();

    assert!(!h.app.complete_location_request(ticket, Ok(Coordinate::new(1.0, 1.0))));
    assert_eq!(h.app.state().pending(), None);
    assert_eq!(h.app.state().method(), LocationMethod::Manual);
    assert_eq!(h.app.state().location_status().text, "");
}

#[test]
fn startup_recenter_moves_map_on_success() {
    let mut h = harness();
    h.geo.push_fix(8.4, 124.9);

    assert!(block_on(h.app.recenter_on_device()));

    let views = &map_of(&h.app).set_views;
    assert_eq!(views.last(), Some(&(Coordinate::new(8.4, 124.9), 14)));
    // the form is not touched
    assert_eq!(h.app.state().pending(), None);
    assert_eq!(h.app.state().location_status().text, "");
}

#[test]
fn startup_recenter_failure_keeps_default_view() {
    let mut h = harness();
    h.geo.push_error(1);

    assert!(!block_on(h.app.recenter_on_device()));

    let views = &map_of(&h.app).set_views;
    assert_eq!(views, &vec![(Coordinate::new(8.36, 124.86), 13)]);
    assert_eq!(h.app.state().location_status().text, "");
    assert!(h.app.view().notice.is_none());
}
