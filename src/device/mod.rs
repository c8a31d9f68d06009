//! The irrigation device's HTTP interface.
//!
//! Wire types for `GET /data`, `POST /control` and `GET /analysis`, plus the
//! [`Device`] trait the page controllers talk to. [`HttpDevice`] is the real
//! implementation; tests substitute scripted fakes.

mod client;

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use client::HttpDevice;

// ---------------------------------------------------------------------------
// Pump state / commands
// ---------------------------------------------------------------------------

/// Actuation state of the irrigation pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PumpState {
    On,
    Off,
}

impl PumpState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl fmt::Display for PumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
        }
    }
}

/// Manual command accepted by `POST /control`.
pub type PumpCommand = PumpState;

/// Request body for `POST /control`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    pub command: PumpCommand,
}

// ---------------------------------------------------------------------------
// Moisture category
// ---------------------------------------------------------------------------

/// Soil moisture label computed by the device from the moisture percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoistureCategory {
    VeryDry,
    Dry,
    Moist,
    Wet,
    VeryWet,
}

impl MoistureCategory {
    /// All categories from driest to wettest.
    pub const ALL: [Self; 5] = [
        Self::VeryDry,
        Self::Dry,
        Self::Moist,
        Self::Wet,
        Self::VeryWet,
    ];

    /// Label as it appears on the wire and on screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryDry => "Sangat Kering",
            Self::Dry => "Kering",
            Self::Moist => "Lembab",
            Self::Wet => "Basah",
            Self::VeryWet => "Sangat Basah",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Category for a moisture percentage, using the device's boundaries.
    pub fn from_moisture(moisture: f64) -> Self {
        if moisture <= 7.7 {
            Self::VeryDry
        } else if moisture <= 17.0 {
            Self::Dry
        } else if moisture <= 22.6 {
            Self::Moist
        } else if moisture <= 27.5 {
            Self::Wet
        } else {
            Self::VeryWet
        }
    }
}

impl fmt::Display for MoistureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// GET /data
// ---------------------------------------------------------------------------

/// One live reading from `GET /data`.
///
/// `category` stays a string so an unexpected label still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub moisture: f64,
    pub level: f64,
    pub pump_state: PumpState,
    pub category: String,
    pub timestamp: String,
    pub log: String,
}

// ---------------------------------------------------------------------------
// GET /analysis
// ---------------------------------------------------------------------------

/// Aggregate statistics from `GET /analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub total_pump_on_time_seconds: f64,
    pub total_records: u64,
    pub avg_moisture: f64,
    pub max_moisture: f64,
    pub min_moisture: f64,
    pub avg_level: f64,
    pub max_level: f64,
    pub min_level: f64,
}

/// Decoded `/analysis` response: either statistics or the device's reason
/// for not having any yet.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResponse {
    Ready(AnalysisSnapshot),
    Unavailable(String),
}

impl AnalysisResponse {
    /// Decode a raw `/analysis` body. Any `error` member wins over the
    /// statistics fields.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
            let reason = match err.as_str() {
                Some(s) => s.to_string(),
                None => err.to_string(),
            };
            return Ok(Self::Unavailable(reason));
        }
        let snapshot = serde_json::from_value(value)?;
        Ok(Self::Ready(snapshot))
    }
}

// ---------------------------------------------------------------------------
// Device trait
// ---------------------------------------------------------------------------

/// The three operations the dashboard needs from the device.
pub trait Device {
    /// `GET /data`.
    fn fetch_reading(&self) -> Result<Reading>;

    /// `POST /control`. The response body is ignored.
    fn send_command(&self, command: PumpCommand) -> Result<()>;

    /// `GET /analysis`.
    fn fetch_analysis(&self) -> Result<AnalysisResponse>;
}

impl<D: Device + ?Sized> Device for &D {
    fn fetch_reading(&self) -> Result<Reading> {
        (**self).fetch_reading()
    }

    fn send_command(&self, command: PumpCommand) -> Result<()> {
        (**self).send_command(command)
    }

    fn fetch_analysis(&self) -> Result<AnalysisResponse> {
        (**self).fetch_analysis()
    }
}

/// Parse a command typed by an operator (`on`, `OFF`, ...).
pub fn parse_command(input: &str) -> Option<PumpCommand> {
    match input.trim().to_ascii_uppercase().as_str() {
        "ON" => Some(PumpState::On),
        "OFF" => Some(PumpState::Off),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
