/// End-to-end tests: the simulator on an ephemeral port, driven through the
/// real HTTP client and the page controllers.
mod common;

use std::time::Duration;

use common::{RecordingAnalysisView, RecordingLiveView, isolate_home};
use sawah::analysis::{AnalysisPage, ExportOutcome, LoadOutcome, NO_DATA_ALERT};
use sawah::config::SawahConfig;
use sawah::config::schema::SimulatorConfig;
use sawah::dashboard::{ControlOutcome, LiveDashboard, PollOutcome};
use sawah::device::{AnalysisResponse, Device, HttpDevice, MoistureCategory, PumpState};
use sawah::simulator;

/// Start a seeded simulator in a background thread and return a client for it.
fn start_simulator(seed: u64) -> HttpDevice {
    let config = SimulatorConfig {
        addr: "127.0.0.1:0".to_string(),
        ..SimulatorConfig::default()
    };
    let server = simulator::bind(&config, Some(seed)).expect("simulator should bind");
    let addr = server.local_addr().expect("simulator listens on TCP");
    std::thread::spawn(move || server.run());
    HttpDevice::new(&format!("http://{addr}"), Duration::from_secs(2))
}

#[test]
fn readings_round_trip_over_http() {
    let device = start_simulator(11);

    let reading = device.fetch_reading().unwrap();
    assert!((0.0..=100.0).contains(&reading.moisture));
    assert!(reading.level >= 0.0);
    assert!(MoistureCategory::from_label(&reading.category).is_some());
    assert!(!reading.timestamp.is_empty());
}

#[test]
fn analysis_is_unavailable_until_the_first_reading() {
    let device = start_simulator(12);

    assert!(matches!(
        device.fetch_analysis().unwrap(),
        AnalysisResponse::Unavailable(_)
    ));

    for _ in 0..4 {
        device.fetch_reading().unwrap();
    }
    let AnalysisResponse::Ready(snapshot) = device.fetch_analysis().unwrap() else {
        panic!("expected statistics after four readings");
    };
    assert_eq!(snapshot.total_records, 4);
    assert!(snapshot.min_moisture <= snapshot.avg_moisture);
    assert!(snapshot.avg_moisture <= snapshot.max_moisture);
}

#[test]
fn manual_command_is_reflected_in_the_next_reading() {
    let device = start_simulator(13);

    device.send_command(PumpState::Off).unwrap();
    let reading = device.fetch_reading().unwrap();
    assert!(reading.log.starts_with("Auto") || reading.log.starts_with("EMERGENCY"));

    device.send_command(PumpState::On).unwrap();
    // The next cycle starts from ON; auto logic may switch it back off only
    // when the soil is wet or the water is high.
    let reading = device.fetch_reading().unwrap();
    if reading.pump_state == PumpState::Off {
        assert!(reading.moisture > 40.0 || reading.level > 15.0);
    }
}

#[test]
fn dashboard_and_analysis_page_against_the_simulator() {
    isolate_home();
    let device = start_simulator(14);
    let config = SawahConfig::default();

    let mut page = AnalysisPage::new(&config);
    let mut analysis_view = RecordingAnalysisView::default();
    assert_eq!(page.load(&device, &mut analysis_view), LoadOutcome::Unavailable);
    assert_eq!(analysis_view.alerts, vec![NO_DATA_ALERT.to_string()]);

    let mut dashboard = LiveDashboard::new(&config);
    let mut live_view = RecordingLiveView::default();
    for _ in 0..3 {
        assert_eq!(dashboard.poll(&device, &mut live_view), PollOutcome::Updated);
    }
    assert_eq!(
        dashboard.control(&device, &mut live_view, PumpState::Off),
        ControlOutcome::Sent
    );
    assert_eq!(dashboard.chart().len(), 4);

    let mut analysis_view = RecordingAnalysisView::default();
    assert_eq!(page.load(&device, &mut analysis_view), LoadOutcome::Rendered);
    assert_eq!(analysis_view.rendered[0].total_records, "4");
    assert_eq!(
        page.export(&device, &mut analysis_view).unwrap(),
        ExportOutcome::Delivered
    );
    assert_eq!(analysis_view.files[0].1.lines().count(), 9);
}

#[test]
fn invalid_control_body_is_rejected() {
    let device = start_simulator(15);
    let url = format!("{}/control", device.base_url());

    let result = ureq::post(&url).send_json(serde_json::json!({ "command": "TOGGLE" }));
    match result {
        Err(ureq::Error::Status(code, _)) => assert_eq!(code, 400),
        other => panic!("expected 400, got {other:?}"),
    }
}

#[test]
fn responses_allow_cross_origin_polling() {
    let device = start_simulator(16);
    let url = format!("{}/data", device.base_url());

    let resp = ureq::get(&url).call().unwrap();
    assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
}
