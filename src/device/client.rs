/// Synchronous HTTP client for the irrigation device.
///
/// Talks to the device service (default `http://127.0.0.1:5000`) using
/// `ureq`. Every request carries the configured timeout so a hung device
/// never blocks the refresh loop for longer than one request.
use std::time::Duration;

use anyhow::{Context, Result};

use super::{AnalysisResponse, ControlRequest, Device, PumpCommand, Reading};
use crate::config::schema::DeviceConfig;

/// Device client over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpDevice {
    base_url: String,
    timeout: Duration,
}

impl HttpDevice {
    /// Build a client from the resolved `[device]` config.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Device for HttpDevice {
    fn fetch_reading(&self) -> Result<Reading> {
        let url = self.url("/data");
        let resp = ureq::get(&url)
            .timeout(self.timeout)
            .call()
            .with_context(|| format!("GET {url} failed"))?;

        resp.into_json()
            .context("failed to parse /data response")
    }

    fn send_command(&self, command: PumpCommand) -> Result<()> {
        let url = self.url("/control");
        match ureq::post(&url)
            .timeout(self.timeout)
            .send_json(ControlRequest { command })
        {
            // Any HTTP reply completes the request; its body and status are ignored.
            Ok(_) | Err(ureq::Error::Status(..)) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("POST {url} ({command}) failed")),
        }
    }

    fn fetch_analysis(&self) -> Result<AnalysisResponse> {
        let url = self.url("/analysis");
        // An error status may still carry an `{"error": ...}` body worth decoding.
        let resp = match ureq::get(&url).timeout(self.timeout).call() {
            Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
            Err(e) => return Err(e).with_context(|| format!("GET {url} failed")),
        };

        let value: serde_json::Value = resp
            .into_json()
            .context("failed to parse /analysis response")?;
        AnalysisResponse::from_json(value).context("unexpected /analysis payload")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
