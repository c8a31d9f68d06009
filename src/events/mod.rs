//! Event log: one JSON line per noteworthy dashboard event.
//!
//! Records poll failures, control commands (sent, refused, failed), analysis
//! alerts and exports so an operator can reconstruct what happened while the
//! dashboard was unattended. `sawah events` prints the tail.
//!
//! Log file: `~/.sawah/events.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// What kind of event a log line describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PollFailed,
    ControlSent,
    ControlRefused,
    ControlFailed,
    AnalysisUnavailable,
    AnalysisFailed,
    ExportWritten,
    Served,
}

impl EventKind {
    /// Whether the event describes a failure (printed to stderr as well).
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::PollFailed | Self::ControlFailed | Self::AnalysisFailed
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PollFailed => "poll_failed",
            Self::ControlSent => "control_sent",
            Self::ControlRefused => "control_refused",
            Self::ControlFailed => "control_failed",
            Self::AnalysisUnavailable => "analysis_unavailable",
            Self::AnalysisFailed => "analysis_failed",
            Self::ExportWritten => "export_written",
            Self::Served => "served",
        };
        f.write_str(name)
    }
}

/// A single entry in `~/.sawah/events.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub timestamp: String,
    pub kind: EventKind,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Record an event. Failures also go to stderr.
///
/// Best-effort: I/O errors writing the log file are ignored.
pub fn record(kind: EventKind, message: impl Into<String>) {
    let entry = EventEntry {
        timestamp: Utc::now().to_rfc3339(),
        kind,
        message: message.into(),
    };

    if kind.is_error() {
        eprintln!("{} {}", format!("[{kind}]").red().bold(), entry.message);
    }

    let _ = append_entry(&entry);
}

/// Record a failure with its full `anyhow` cause chain.
pub fn record_error(kind: EventKind, err: &anyhow::Error) {
    record(kind, format!("{err:#}"));
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read all event entries, skipping malformed lines.
pub fn read_all_entries() -> Vec<EventEntry> {
    let Some(path) = events_log_path() else {
        return Vec::new();
    };

    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    parse_entries(BufReader::new(file))
}

/// The last `limit` entries, oldest first.
pub fn read_recent(limit: usize) -> Vec<EventEntry> {
    let mut entries = read_all_entries();
    let skip = entries.len().saturating_sub(limit);
    entries.drain(..skip);
    entries
}

fn parse_entries(reader: impl BufRead) -> Vec<EventEntry> {
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<EventEntry>(&line).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_entry(entry: &EventEntry) -> anyhow::Result<()> {
    let Some(path) = events_log_path() else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the event log file.
pub fn events_log_path() -> Option<PathBuf> {
    config::sawah_home().map(|dir| dir.join("events.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
