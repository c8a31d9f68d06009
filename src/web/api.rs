//! JSON API handlers for the dashboard pages.
//!
//! Each handler drives the same controller the terminal uses, through a
//! view that collects the rendered pieces into a response body instead of
//! drawing them.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};

use crate::analysis::{AnalysisFields, AnalysisPage, AnalysisView, ExportOutcome};
use crate::config::SawahConfig;
use crate::dashboard::chart::{ChartAxes, ChartWindow};
use crate::dashboard::gate::{ButtonGate, GateThresholds};
use crate::dashboard::{ControlOutcome, LiveDashboard, LiveView, PollOutcome, ReadingView};
use crate::device::{Device, parse_command};

/// Status and body of one API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: ApiBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Csv { file_name: String, contents: String },
}

impl ApiReply {
    pub fn json<T: Serialize>(status: u16, data: &T) -> Self {
        let value = serde_json::to_value(data)
            .unwrap_or_else(|e| json!({ "error": format!("serialization failed: {e}") }));
        Self {
            status,
            body: ApiBody::Json(value),
        }
    }

    /// The JSON body, if this is a JSON reply.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ApiBody::Json(value) => Some(value),
            ApiBody::Csv { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Collecting views
// ---------------------------------------------------------------------------

/// What one live cycle rendered, as sent to the page.
#[derive(Debug, Clone, Default, Serialize)]
struct LivePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    reading: Option<ReadingView>,
    gate: ButtonGate,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<ChartWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

impl LiveView for LivePayload {
    fn render_reading(&mut self, reading: &ReadingView) {
        self.reading = Some(reading.clone());
    }

    fn render_gate(&mut self, gate: &ButtonGate) {
        self.gate = *gate;
    }

    fn render_chart(&mut self, chart: &ChartWindow) {
        self.chart = Some(chart.clone());
    }

    fn render_poll_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn render_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }
}

#[derive(Debug, Default, Serialize)]
struct AnalysisPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<AnalysisFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<String>,
    #[serde(skip)]
    csv: Option<(String, String)>,
}

impl AnalysisView for AnalysisPayload {
    fn render_analysis(&mut self, fields: &AnalysisFields) {
        self.fields = Some(fields.clone());
    }

    fn alert(&mut self, message: &str) {
        // The page shows one alert at a time; keep the first.
        if self.alert.is_none() {
            self.alert = Some(message.to_string());
        }
    }

    fn deliver_csv(&mut self, file_name: &str, contents: &str) -> Result<()> {
        self.csv = Some((file_name.to_string(), contents.to_string()));
        Ok(())
    }

    // Printing happens in the browser.
    fn print(&mut self) {}
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Settings {
    device_url: String,
    poll_interval_ms: u64,
    axes: ChartAxes,
    thresholds: GateThresholds,
    export_file_name: String,
}

/// State behind the web pages: one device, one live dashboard, one
/// analysis page.
pub struct WebApp<D: Device> {
    device: D,
    dashboard: LiveDashboard,
    analysis: AnalysisPage,
    settings: Settings,
}

impl<D: Device> WebApp<D> {
    pub fn new(device: D, config: &SawahConfig) -> Self {
        Self {
            device,
            dashboard: LiveDashboard::new(config),
            analysis: AnalysisPage::new(config),
            settings: Settings {
                device_url: config.device.base_url.clone(),
                poll_interval_ms: config.poll.interval_ms,
                axes: ChartAxes::from_config(&config.chart),
                thresholds: GateThresholds::from_config(&config.gate),
                export_file_name: config.export.file_name.clone(),
            },
        }
    }

    /// `GET /api/settings`
    pub fn settings(&self) -> ApiReply {
        ApiReply::json(200, &self.settings)
    }

    /// `GET /api/live`: one poll. 502 carries the connectivity message.
    pub fn live(&mut self) -> ApiReply {
        let mut payload = LivePayload::default();
        let status = match self.dashboard.poll(&self.device, &mut payload) {
            PollOutcome::Updated => 200,
            PollOutcome::Failed => {
                payload.gate = self.dashboard.gate();
                payload.chart = Some(self.dashboard.chart().clone());
                502
            }
        };
        ApiReply::json(status, &payload)
    }

    /// `POST /api/control` with `{"command": "ON" | "OFF"}`.
    pub fn control(&mut self, body: &str) -> ApiReply {
        let command = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("command")?.as_str().and_then(parse_command));
        let Some(command) = command else {
            return ApiReply::json(400, &json!({ "error": "command must be ON or OFF" }));
        };

        let mut payload = LivePayload::default();
        match self.dashboard.control(&self.device, &mut payload, command) {
            ControlOutcome::Sent => ApiReply::json(200, &payload),
            ControlOutcome::Refused => {
                payload.gate = self.dashboard.gate();
                ApiReply::json(409, &payload)
            }
            ControlOutcome::Failed => {
                ApiReply::json(502, &json!({ "error": "control request failed" }))
            }
        }
    }

    /// `GET /api/analysis`: fields, or a single alert.
    pub fn analysis(&mut self) -> ApiReply {
        let mut payload = AnalysisPayload::default();
        self.analysis.load(&self.device, &mut payload);
        ApiReply::json(200, &payload)
    }

    /// `GET /api/analysis/export.csv`: the cached snapshot as a download,
    /// or 409 with an alert after refetching.
    pub fn export_csv(&mut self) -> Result<ApiReply> {
        let mut payload = AnalysisPayload::default();
        match self.analysis.export(&self.device, &mut payload)? {
            ExportOutcome::Delivered => {
                let (file_name, contents) = payload.csv.take().unwrap_or_default();
                Ok(ApiReply {
                    status: 200,
                    body: ApiBody::Csv {
                        file_name,
                        contents,
                    },
                })
            }
            ExportOutcome::Refetched(_) => Ok(ApiReply::json(409, &payload)),
        }
    }
}
