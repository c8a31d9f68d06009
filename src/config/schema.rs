/// Configuration schema and defaults for sawah.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[device]`, `[poll]`, `[gate]`, `[chart]`, `[export]`, `[web]` and
/// `[simulator]`.
///
/// Every field has a built-in default matching the stock field installation
/// (device on `127.0.0.1:5000`, 2 s polling, 10/15 cm water level limits).
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level sawah configuration.
///
/// Maps directly to the `~/.sawah/config.toml` and `.sawah.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SawahConfig {
    pub device: DeviceConfig,
    pub poll: PollConfig,
    pub gate: GateConfig,
    pub chart: ChartConfig,
    pub export: ExportConfig,
    pub web: WebConfig,
    pub simulator: SimulatorConfig,
}

// ---------------------------------------------------------------------------
// [device]
// ---------------------------------------------------------------------------

/// Where the irrigation device's HTTP service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL of the device service (no trailing slash needed).
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// [poll]
// ---------------------------------------------------------------------------

/// What the polling loop does after a failed `/data` fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Retry on the next regular tick, no matter how many failures in a row.
    #[default]
    Fixed,
    /// Double the delay after each consecutive failure, up to `backoff_max_ms`.
    Backoff,
}

impl std::fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Backoff => write!(f, "backoff"),
        }
    }
}

/// Live dashboard refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between two `/data` polls (milliseconds).
    pub interval_ms: u64,
    /// Behaviour after a failed poll: `fixed` or `backoff`.
    pub retry: RetryPolicy,
    /// Upper bound for the backoff delay (milliseconds).
    pub backoff_max_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            retry: RetryPolicy::default(),
            backoff_max_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [gate]
// ---------------------------------------------------------------------------

/// Water level limits for manual pump activation (centimetres).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// From this level on the ON control is flagged as a warning.
    pub warning_level_cm: f64,
    /// From this level on the ON control is disabled.
    pub emergency_level_cm: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            warning_level_cm: 10.0,
            emergency_level_cm: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [chart]
// ---------------------------------------------------------------------------

/// Live chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Number of points kept on screen.
    pub window: usize,
    /// Suggested upper bound of the moisture axis (%).
    pub moisture_axis_max: f64,
    /// Suggested upper bound of the water level axis (cm).
    pub level_axis_max: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window: 20,
            moisture_axis_max: 100.0,
            level_axis_max: 20.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Name of the exported file.
    pub file_name: String,
    /// Directory the terminal export writes into. Empty means the current
    /// working directory.
    pub directory: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "analisis_harian_irigasi.csv".to_string(),
            directory: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Browser dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address of `sawah web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9750".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [simulator]
// ---------------------------------------------------------------------------

/// Device simulator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Listen address of `sawah simulate`.
    pub addr: String,
    /// Seconds one `/data` cycle stands for in the pump-on total.
    pub cycle_seconds: u64,
    /// The automatic logic switches the pump on at or below this moisture (%).
    pub auto_on_moisture: f64,
    /// The automatic logic switches the pump off above this moisture (%).
    pub auto_off_moisture: f64,
    /// The automatic logic forces the pump off above this level (cm).
    pub emergency_level_cm: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            cycle_seconds: 2,
            auto_on_moisture: 17.0,
            auto_off_moisture: 40.0,
            emergency_level_cm: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults as annotated TOML
// ---------------------------------------------------------------------------

impl SawahConfig {
    /// Annotated default config written by `sawah config init`.
    pub fn default_toml() -> String {
        r#"# sawah configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (SAWAH_*)
#   2. Project config (.sawah.toml in current directory)
#   3. User global config (~/.sawah/config.toml)
#   4. Built-in defaults

[device]
base_url = "http://127.0.0.1:5000"
timeout_ms = 5000

[poll]
interval_ms = 2000
retry = "fixed"          # fixed | backoff
backoff_max_ms = 30000

[gate]
warning_level_cm = 10.0
emergency_level_cm = 15.0

[chart]
window = 20
moisture_axis_max = 100.0
level_axis_max = 20.0

[export]
file_name = "analisis_harian_irigasi.csv"
directory = ""           # empty: current directory

[web]
addr = "127.0.0.1:9750"
open_browser = true

[simulator]
addr = "127.0.0.1:5000"
cycle_seconds = 2
auto_on_moisture = 17.0
auto_off_moisture = 40.0
emergency_level_cm = 15.0
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let config: SawahConfig = toml::from_str(&SawahConfig::default_toml()).unwrap();
        assert_eq!(config.device.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.poll.interval_ms, 2000);
        assert_eq!(config.poll.retry, RetryPolicy::Fixed);
        assert_eq!(config.chart.window, 20);
        assert_eq!(config.export.file_name, "analisis_harian_irigasi.csv");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: SawahConfig = toml::from_str("").unwrap();
        assert_eq!(config.gate.warning_level_cm, 10.0);
        assert_eq!(config.gate.emergency_level_cm, 15.0);
        assert!(config.web.open_browser);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml_str = r#"
[poll]
retry = "backoff"

[device]
base_url = "http://10.0.0.7:5000"
"#;
        let config: SawahConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.poll.retry, RetryPolicy::Backoff);
        assert_eq!(config.poll.interval_ms, 2000);
        assert_eq!(config.device.base_url, "http://10.0.0.7:5000");
        assert_eq!(config.device.timeout_ms, 5000);
    }

    #[test]
    fn retry_policy_display() {
        assert_eq!(RetryPolicy::Fixed.to_string(), "fixed");
        assert_eq!(RetryPolicy::Backoff.to_string(), "backoff");
    }
}
