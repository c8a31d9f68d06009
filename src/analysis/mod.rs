//! Analysis page controller.
//!
//! Fetches `GET /analysis` once on load, renders the summary fields and
//! serves print and CSV export from the last snapshot it fetched. The
//! snapshot is written only by [`AnalysisPage::load`] and read only by
//! [`AnalysisPage::export`] and [`AnalysisPage::print`].

pub mod export;
pub mod terminal;

use anyhow::Result;
use serde::Serialize;

use crate::config::SawahConfig;
use crate::device::{AnalysisResponse, AnalysisSnapshot, Device};
use crate::events::{self, EventKind};

pub const NO_DATA_ALERT: &str = "Not enough data to analyse yet. Run the live dashboard first.";
pub const CONNECTIVITY_ALERT: &str =
    "Cannot reach the device. Make sure the device service is running.";
pub const NO_SNAPSHOT_ALERT: &str =
    "No analysis data loaded yet. Fetching it now, export again once it is shown.";

// ---------------------------------------------------------------------------
// Display fields
// ---------------------------------------------------------------------------

/// The eight summary fields as shown on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisFields {
    pub total_pump_time: String,
    pub total_records: String,
    pub avg_moisture: String,
    pub max_moisture: String,
    pub min_moisture: String,
    pub avg_level: String,
    pub max_level: String,
    pub min_level: String,
}

impl AnalysisFields {
    pub fn from_snapshot(s: &AnalysisSnapshot) -> Self {
        Self {
            total_pump_time: format!("{} detik", s.total_pump_on_time_seconds),
            total_records: s.total_records.to_string(),
            avg_moisture: s.avg_moisture.to_string(),
            max_moisture: s.max_moisture.to_string(),
            min_moisture: s.min_moisture.to_string(),
            avg_level: s.avg_level.to_string(),
            max_level: s.max_level.to_string(),
            min_level: s.min_level.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// View interface
// ---------------------------------------------------------------------------

/// Rendering surface of the analysis page.
pub trait AnalysisView {
    fn render_analysis(&mut self, fields: &AnalysisFields);

    /// Blocking, operator-facing alert.
    fn alert(&mut self, message: &str);

    /// Hand a finished CSV document to the operator.
    fn deliver_csv(&mut self, file_name: &str, contents: &str) -> Result<()>;

    /// Print the page as currently rendered.
    fn print(&mut self);
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    /// The device answered with an error member; one alert, no fields.
    Unavailable,
    /// The request failed; one alert, no fields.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Delivered,
    /// Nothing cached yet: the operator was alerted and a fetch was issued.
    Refetched(LoadOutcome),
}

#[derive(Debug, Clone)]
pub struct AnalysisPage {
    snapshot: Option<AnalysisSnapshot>,
    export_file_name: String,
}

impl AnalysisPage {
    pub fn new(config: &SawahConfig) -> Self {
        Self {
            snapshot: None,
            export_file_name: config.export.file_name.clone(),
        }
    }

    /// Fetch `/analysis` and render it.
    pub fn load(&mut self, device: &impl Device, view: &mut impl AnalysisView) -> LoadOutcome {
        match device.fetch_analysis() {
            Ok(AnalysisResponse::Ready(snapshot)) => {
                view.render_analysis(&AnalysisFields::from_snapshot(&snapshot));
                self.snapshot = Some(snapshot);
                LoadOutcome::Rendered
            }
            Ok(AnalysisResponse::Unavailable(reason)) => {
                events::record(EventKind::AnalysisUnavailable, reason);
                view.alert(NO_DATA_ALERT);
                LoadOutcome::Unavailable
            }
            Err(err) => {
                events::record_error(EventKind::AnalysisFailed, &err);
                view.alert(CONNECTIVITY_ALERT);
                LoadOutcome::Failed
            }
        }
    }

    /// Export the cached snapshot as CSV.
    ///
    /// Without a snapshot the operator is alerted and the analysis is fetched
    /// again instead; no file is produced.
    pub fn export(
        &mut self,
        device: &impl Device,
        view: &mut impl AnalysisView,
    ) -> Result<ExportOutcome> {
        let Some(snapshot) = &self.snapshot else {
            view.alert(NO_SNAPSHOT_ALERT);
            let outcome = self.load(device, view);
            return Ok(ExportOutcome::Refetched(outcome));
        };

        let contents = export::build_csv(snapshot)?;
        view.deliver_csv(&self.export_file_name, &contents)?;
        events::record(
            EventKind::ExportWritten,
            format!("{} ({} bytes)", self.export_file_name, contents.len()),
        );
        Ok(ExportOutcome::Delivered)
    }

    pub fn print(&self, view: &mut impl AnalysisView) {
        view.print();
    }

    pub fn snapshot(&self) -> Option<&AnalysisSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn export_file_name(&self) -> &str {
        &self.export_file_name
    }
}
