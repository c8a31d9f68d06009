/// Integration tests for the live dashboard controller.
///
/// Drives `LiveDashboard` and the `watch` loop against a scripted device and
/// a recording view:
///
/// - Reading rendering and the ON gate
/// - Chart window bound and FIFO eviction
/// - Control dispatch: gating, refresh after success, silence after failure
/// - Poll failure handling and the refresh loop
mod common;

use std::sync::mpsc;

use common::{FakeDevice, RecordingLiveView, isolate_home, reading};
use sawah::config::SawahConfig;
use sawah::dashboard::gate::{TOOLTIP_EMERGENCY, TOOLTIP_WARNING};
use sawah::dashboard::{
    CONNECTIVITY_ERROR, ControlOutcome, LiveDashboard, PollOutcome, WatchInput, watch,
};
use sawah::device::{PumpState, Reading};

fn fast_config() -> SawahConfig {
    let mut config = SawahConfig::default();
    config.poll.interval_ms = 5;
    config
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn data_payload_renders_every_field() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(Reading {
        moisture: 55.0,
        level: 8.0,
        pump_state: PumpState::Off,
        category: "Lembab".to_string(),
        timestamp: "T1".to_string(),
        log: "ok".to_string(),
    });

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    assert_eq!(dashboard.poll(&device, &mut view), PollOutcome::Updated);

    let rendered = &view.readings[0];
    assert_eq!(rendered.moisture_text, "55 %");
    assert_eq!(rendered.level_text, "8 cm");
    assert_eq!(rendered.indicator_class, "status-off");
    assert_eq!(rendered.category_label, "Lembab");
    assert_eq!(rendered.category_class, "lembab");
    assert_eq!(rendered.log_text, "[T1] ok");
    assert_eq!(view.chart_lengths, vec![1]);
    assert!(view.errors.is_empty());
}

#[test]
fn gate_follows_each_reading() {
    isolate_home();
    let device = FakeDevice::new();
    for level in [3.0, 10.0, 14.9, 15.0, 22.0, 9.99] {
        device.push_reading(reading(20.0, level, PumpState::Off, "t"));
    }

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    for _ in 0..6 {
        dashboard.poll(&device, &mut view);
    }

    let states: Vec<(bool, bool)> = view.gates.iter().map(|g| (g.disabled, g.warning)).collect();
    assert_eq!(
        states,
        vec![
            (false, false),
            (false, true),
            (false, true),
            (true, false),
            (true, false),
            (false, false),
        ]
    );
    assert_eq!(view.gates[1].tooltip, TOOLTIP_WARNING);
    assert_eq!(view.gates[3].tooltip, TOOLTIP_EMERGENCY);
}

#[test]
fn chart_keeps_the_last_twenty_points() {
    isolate_home();
    let device = FakeDevice::new();
    for i in 0..45 {
        device.push_reading(reading(i as f64, 1.0, PumpState::Off, &format!("t{i}")));
    }

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    for _ in 0..45 {
        dashboard.poll(&device, &mut view);
    }

    assert!(view.chart_lengths.iter().all(|&len| len <= 20));
    let chart = dashboard.chart();
    assert_eq!(chart.len(), 20);
    assert_eq!(chart.labels().front().map(String::as_str), Some("t25"));
    assert_eq!(chart.labels().back().map(String::as_str), Some("t44"));
    assert_eq!(chart.moisture().front(), Some(&25.0));
    assert_eq!(chart.level().len(), 20);
}

// ---------------------------------------------------------------------------
// Poll failures
// ---------------------------------------------------------------------------

#[test]
fn failed_poll_shows_connectivity_message_and_keeps_state() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(30.0, 16.0, PumpState::On, "t1"));
    device.push_reading_error();

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    dashboard.poll(&device, &mut view);
    assert_eq!(dashboard.poll(&device, &mut view), PollOutcome::Failed);

    assert_eq!(view.errors, vec![CONNECTIVITY_ERROR.to_string()]);
    assert_eq!(view.readings.len(), 1);
    assert_eq!(dashboard.chart().len(), 1);
    // The gate still reflects the last reading that arrived.
    assert!(dashboard.gate().disabled);
    assert_eq!(dashboard.schedule().consecutive_failures(), 1);
}

// ---------------------------------------------------------------------------
// Control dispatch
// ---------------------------------------------------------------------------

#[test]
fn on_is_refused_at_emergency_level_without_a_request() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(5.0, 15.0, PumpState::Off, "t1"));

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    dashboard.poll(&device, &mut view);

    let outcome = dashboard.control(&device, &mut view, PumpState::On);
    assert_eq!(outcome, ControlOutcome::Refused);
    assert!(device.commands.borrow().is_empty());
    assert_eq!(view.notices, vec![TOOLTIP_EMERGENCY.to_string()]);
    assert_eq!(device.reading_calls.get(), 1);
}

#[test]
fn off_is_never_gated() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(5.0, 18.0, PumpState::On, "t1"));
    device.push_reading(reading(5.0, 18.0, PumpState::Off, "t2"));

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    dashboard.poll(&device, &mut view);

    assert_eq!(
        dashboard.control(&device, &mut view, PumpState::Off),
        ControlOutcome::Sent
    );
    assert_eq!(*device.commands.borrow(), vec![PumpState::Off]);
}

#[test]
fn successful_command_refreshes_immediately() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(12.0, 4.0, PumpState::Off, "t1"));
    device.push_reading(reading(12.0, 4.0, PumpState::On, "t2"));

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    dashboard.poll(&device, &mut view);

    assert_eq!(
        dashboard.control(&device, &mut view, PumpState::On),
        ControlOutcome::Sent
    );
    assert_eq!(device.reading_calls.get(), 2);
    assert_eq!(view.readings.last().map(|r| r.pump_state), Some(PumpState::On));
    assert_eq!(
        dashboard.last_reading().map(|r| r.timestamp.as_str()),
        Some("t2")
    );
}

#[test]
fn failed_command_is_silent_and_skips_the_refresh() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(12.0, 4.0, PumpState::Off, "t1"));
    device.fail_control();

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    dashboard.poll(&device, &mut view);

    assert_eq!(
        dashboard.control(&device, &mut view, PumpState::On),
        ControlOutcome::Failed
    );
    assert_eq!(device.reading_calls.get(), 1);
    assert!(view.notices.is_empty());
    assert!(view.errors.is_empty());
}

// ---------------------------------------------------------------------------
// Refresh loop
// ---------------------------------------------------------------------------

#[test]
fn watch_stops_after_max_polls() {
    isolate_home();
    let device = FakeDevice::new();
    for i in 0..3 {
        device.push_reading(reading(20.0, 2.0, PumpState::Off, &format!("t{i}")));
    }

    let (_tx, rx) = mpsc::channel::<WatchInput>();
    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    watch(&mut dashboard, &device, &mut view, &rx, Some(3));

    assert_eq!(device.reading_calls.get(), 3);
    assert_eq!(view.presents, 3);
    assert_eq!(dashboard.chart().len(), 3);
}

#[test]
fn watch_keeps_polling_after_failures() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading_error();
    device.push_reading_error();
    device.push_reading(reading(20.0, 2.0, PumpState::Off, "t3"));

    let (_tx, rx) = mpsc::channel::<WatchInput>();
    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    watch(&mut dashboard, &device, &mut view, &rx, Some(3));

    assert_eq!(view.errors.len(), 2);
    assert_eq!(view.readings.len(), 1);
    assert_eq!(dashboard.schedule().consecutive_failures(), 0);
}

#[test]
fn watch_handles_operator_input_then_quits() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(20.0, 2.0, PumpState::On, "t1"));
    device.push_reading(reading(20.0, 2.0, PumpState::Off, "t2"));

    let (tx, rx) = mpsc::channel();
    tx.send(WatchInput::Command(PumpState::Off)).unwrap();
    tx.send(WatchInput::Quit).unwrap();

    let mut config = fast_config();
    config.poll.interval_ms = 60_000;
    let mut dashboard = LiveDashboard::new(&config);
    let mut view = RecordingLiveView::default();
    watch(&mut dashboard, &device, &mut view, &rx, None);

    assert_eq!(*device.commands.borrow(), vec![PumpState::Off]);
    assert_eq!(device.reading_calls.get(), 2);
}

#[test]
fn watch_survives_closed_input() {
    isolate_home();
    let device = FakeDevice::new();
    device.push_reading(reading(20.0, 2.0, PumpState::Off, "t1"));
    device.push_reading(reading(20.0, 2.0, PumpState::Off, "t2"));

    let (tx, rx) = mpsc::channel::<WatchInput>();
    drop(tx);

    let mut dashboard = LiveDashboard::new(&fast_config());
    let mut view = RecordingLiveView::default();
    watch(&mut dashboard, &device, &mut view, &rx, Some(2));

    assert_eq!(device.reading_calls.get(), 2);
}
