//! Shared fakes for the integration tests.
//!
//! # Safety
//!
//! `isolate_home` calls `std::env::set_var`, which is `unsafe` in Rust 2024.
//! It runs once per test binary, and every test that can touch the event
//! log calls it before doing anything else.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Once;

use anyhow::{Result, anyhow};
use sawah::analysis::{AnalysisFields, AnalysisView};
use sawah::dashboard::chart::ChartWindow;
use sawah::dashboard::gate::ButtonGate;
use sawah::dashboard::{LiveView, ReadingView};
use sawah::device::{AnalysisResponse, AnalysisSnapshot, Device, PumpCommand, PumpState, Reading};

/// Point `SAWAH_HOME` at a scratch directory so tests never write to the
/// real event log.
pub fn isolate_home() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let dir = std::env::temp_dir().join(format!("sawah-tests-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        unsafe { std::env::set_var("SAWAH_HOME", &dir) };
    });
}

pub fn reading(moisture: f64, level: f64, pump_state: PumpState, timestamp: &str) -> Reading {
    Reading {
        moisture,
        level,
        pump_state,
        category: "Lembab".to_string(),
        timestamp: timestamp.to_string(),
        log: "ok".to_string(),
    }
}

pub fn sample_snapshot() -> AnalysisSnapshot {
    AnalysisSnapshot {
        total_pump_on_time_seconds: 120.0,
        total_records: 10,
        avg_moisture: 45.5,
        max_moisture: 80.0,
        min_moisture: 20.0,
        avg_level: 5.5,
        max_level: 12.0,
        min_level: 1.0,
    }
}

// ---------------------------------------------------------------------------
// Scripted device
// ---------------------------------------------------------------------------

/// Device whose responses are queued up front. An empty queue answers with
/// a connection error.
#[derive(Default)]
pub struct FakeDevice {
    readings: RefCell<VecDeque<Result<Reading, String>>>,
    analyses: RefCell<VecDeque<Result<AnalysisResponse, String>>>,
    fail_control: Cell<bool>,
    pub commands: RefCell<Vec<PumpCommand>>,
    pub reading_calls: Cell<usize>,
    pub analysis_calls: Cell<usize>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reading(&self, reading: Reading) -> &Self {
        self.readings.borrow_mut().push_back(Ok(reading));
        self
    }

    pub fn push_reading_error(&self) -> &Self {
        self.readings
            .borrow_mut()
            .push_back(Err("connection refused".to_string()));
        self
    }

    pub fn push_analysis(&self, response: AnalysisResponse) -> &Self {
        self.analyses.borrow_mut().push_back(Ok(response));
        self
    }

    pub fn fail_control(&self) {
        self.fail_control.set(true);
    }
}

impl Device for FakeDevice {
    fn fetch_reading(&self) -> Result<Reading> {
        self.reading_calls.set(self.reading_calls.get() + 1);
        match self.readings.borrow_mut().pop_front() {
            Some(Ok(reading)) => Ok(reading),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("no reading scripted")),
        }
    }

    fn send_command(&self, command: PumpCommand) -> Result<()> {
        self.commands.borrow_mut().push(command);
        if self.fail_control.get() {
            return Err(anyhow!("control endpoint unavailable"));
        }
        Ok(())
    }

    fn fetch_analysis(&self) -> Result<AnalysisResponse> {
        self.analysis_calls.set(self.analysis_calls.get() + 1);
        match self.analyses.borrow_mut().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("no analysis scripted")),
        }
    }
}

// ---------------------------------------------------------------------------
// Recording views
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingLiveView {
    pub readings: Vec<ReadingView>,
    pub gates: Vec<ButtonGate>,
    pub chart_lengths: Vec<usize>,
    pub errors: Vec<String>,
    pub notices: Vec<String>,
    pub presents: usize,
}

impl LiveView for RecordingLiveView {
    fn render_reading(&mut self, reading: &ReadingView) {
        self.readings.push(reading.clone());
    }

    fn render_gate(&mut self, gate: &ButtonGate) {
        self.gates.push(*gate);
    }

    fn render_chart(&mut self, chart: &ChartWindow) {
        self.chart_lengths.push(chart.len());
    }

    fn render_poll_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn render_notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

#[derive(Default)]
pub struct RecordingAnalysisView {
    pub rendered: Vec<AnalysisFields>,
    pub alerts: Vec<String>,
    pub files: Vec<(String, String)>,
    pub prints: usize,
}

impl AnalysisView for RecordingAnalysisView {
    fn render_analysis(&mut self, fields: &AnalysisFields) {
        self.rendered.push(fields.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn deliver_csv(&mut self, file_name: &str, contents: &str) -> Result<()> {
        self.files.push((file_name.to_string(), contents.to_string()));
        Ok(())
    }

    fn print(&mut self) {
        self.prints += 1;
    }
}
