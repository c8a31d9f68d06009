//! Live dashboard controller.
//!
//! Polls `GET /data`, fans each reading out to a [`LiveView`] (value fields,
//! pump indicator, category style, ON gate, chart) and dispatches manual
//! pump commands. The controller owns all live state; views only render.
//!
//! - [`gate`] — water level gate for the ON control
//! - [`chart`] — sliding chart window
//! - [`schedule`] — poll delay under the retry policy
//! - [`terminal`] — terminal rendering for `sawah watch`

pub mod chart;
pub mod gate;
pub mod schedule;
pub mod terminal;

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use serde::Serialize;

use crate::config::SawahConfig;
use crate::device::{Device, MoistureCategory, PumpCommand, PumpState, Reading};
use crate::events::{self, EventKind};

use chart::ChartWindow;
use gate::{ButtonGate, GateThresholds};
use schedule::PollSchedule;

/// Status line shown while the device cannot be reached.
pub const CONNECTIVITY_ERROR: &str =
    "Error: cannot reach the device. Make sure the device service is running.";

// ---------------------------------------------------------------------------
// Reading view model
// ---------------------------------------------------------------------------

/// A reading formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingView {
    pub moisture_text: String,
    pub level_text: String,
    pub pump_state: PumpState,
    pub indicator_class: &'static str,
    pub category_label: String,
    pub category_class: String,
    pub log_text: String,
}

impl ReadingView {
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            moisture_text: format!("{} %", reading.moisture),
            level_text: format!("{} cm", reading.level),
            pump_state: reading.pump_state,
            indicator_class: indicator_class(reading.pump_state),
            category_label: reading.category.clone(),
            category_class: category_class(&reading.category),
            log_text: format!("[{}] {}", reading.timestamp, reading.log),
        }
    }
}

fn indicator_class(state: PumpState) -> &'static str {
    match state {
        PumpState::On => "status-on",
        PumpState::Off => "status-off",
    }
}

/// Style class for a category label, e.g. `"Sangat Kering"` → `"sangat-kering"`.
pub fn category_class(label: &str) -> String {
    match MoistureCategory::from_label(label) {
        Some(category) => category.label().to_ascii_lowercase().replace(' ', "-"),
        None => "category-unknown".to_string(),
    }
}

// ---------------------------------------------------------------------------
// View interface
// ---------------------------------------------------------------------------

/// Rendering surface of the live dashboard.
pub trait LiveView {
    fn render_reading(&mut self, reading: &ReadingView);

    fn render_gate(&mut self, gate: &ButtonGate);

    /// Redraw the chart after a new point.
    fn render_chart(&mut self, chart: &ChartWindow);

    /// Replace the log line after a failed poll.
    fn render_poll_error(&mut self, message: &str);

    /// Short operator-facing notice (refused or failed commands).
    fn render_notice(&mut self, _message: &str) {}

    /// Called once all updates of a cycle have been applied.
    fn present(&mut self) {}
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Updated,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Command accepted by the device; a refresh followed.
    Sent,
    /// ON refused locally because of the water level. Nothing was sent.
    Refused,
    /// The request failed. Logged only.
    Failed,
}

/// State and behaviour of the live dashboard page.
#[derive(Debug, Clone)]
pub struct LiveDashboard {
    chart: ChartWindow,
    thresholds: GateThresholds,
    schedule: PollSchedule,
    gate: ButtonGate,
    last_reading: Option<Reading>,
}

impl LiveDashboard {
    pub fn new(config: &SawahConfig) -> Self {
        Self {
            chart: ChartWindow::new(config.chart.window),
            thresholds: GateThresholds::from_config(&config.gate),
            schedule: PollSchedule::from_config(&config.poll),
            gate: ButtonGate::OPEN,
            last_reading: None,
        }
    }

    /// Fetch `/data` once and update every part of the view.
    pub fn poll(&mut self, device: &impl Device, view: &mut impl LiveView) -> PollOutcome {
        match device.fetch_reading() {
            Ok(reading) => {
                self.schedule.record_success();

                view.render_reading(&ReadingView::from_reading(&reading));

                self.gate = gate::gate(reading.level, self.thresholds);
                view.render_gate(&self.gate);

                self.chart
                    .push(reading.timestamp.clone(), reading.moisture, reading.level);
                view.render_chart(&self.chart);

                self.last_reading = Some(reading);
                PollOutcome::Updated
            }
            Err(err) => {
                events::record_error(EventKind::PollFailed, &err);
                self.schedule.record_failure();
                view.render_poll_error(CONNECTIVITY_ERROR);
                PollOutcome::Failed
            }
        }
    }

    /// Send a manual pump command, then refresh immediately.
    pub fn control(
        &mut self,
        device: &impl Device,
        view: &mut impl LiveView,
        command: PumpCommand,
    ) -> ControlOutcome {
        if command == PumpState::On && self.gate.disabled {
            events::record(
                EventKind::ControlRefused,
                format!("ON refused: {}", self.gate.tooltip),
            );
            view.render_notice(self.gate.tooltip);
            return ControlOutcome::Refused;
        }

        if let Err(err) = device.send_command(command) {
            events::record_error(EventKind::ControlFailed, &err);
            return ControlOutcome::Failed;
        }

        events::record(EventKind::ControlSent, format!("pump set to {command}"));
        self.poll(device, view);
        ControlOutcome::Sent
    }

    pub fn gate(&self) -> ButtonGate {
        self.gate
    }

    pub fn chart(&self) -> &ChartWindow {
        &self.chart
    }

    pub fn last_reading(&self) -> Option<&Reading> {
        self.last_reading.as_ref()
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }
}

// ---------------------------------------------------------------------------
// Refresh loop
// ---------------------------------------------------------------------------

/// Operator input while the refresh loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchInput {
    Command(PumpCommand),
    Refresh,
    Quit,
}

impl WatchInput {
    /// Parse one line typed by the operator.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(command) = crate::device::parse_command(line) {
            return Some(Self::Command(command));
        }
        match line.to_ascii_lowercase().as_str() {
            "" | "r" | "refresh" => Some(Self::Refresh),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run the timer-driven refresh loop.
///
/// Polls immediately, then once per scheduled delay. Operator input is
/// handled as it arrives without moving the next tick. Stops on
/// [`WatchInput::Quit`] or after `max_polls` timer polls.
pub fn watch(
    dashboard: &mut LiveDashboard,
    device: &impl Device,
    view: &mut impl LiveView,
    inputs: &Receiver<WatchInput>,
    max_polls: Option<u64>,
) {
    let mut polls: u64 = 0;
    let mut inputs_open = true;

    dashboard.poll(device, view);
    view.present();
    polls += 1;

    let mut next_tick = Instant::now() + dashboard.schedule().next_delay();

    loop {
        if max_polls.is_some_and(|max| polls >= max) {
            break;
        }

        let wait = next_tick.saturating_duration_since(Instant::now());
        let input = if inputs_open {
            match inputs.recv_timeout(wait) {
                Ok(input) => Some(input),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    inputs_open = false;
                    continue;
                }
            }
        } else {
            std::thread::sleep(wait);
            None
        };

        match input {
            Some(WatchInput::Quit) => break,
            Some(WatchInput::Command(command)) => {
                dashboard.control(device, view, command);
                view.present();
            }
            Some(WatchInput::Refresh) => {
                dashboard.poll(device, view);
                view.present();
            }
            None => {
                dashboard.poll(device, view);
                view.present();
                polls += 1;
                next_tick = Instant::now() + dashboard.schedule().next_delay();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
