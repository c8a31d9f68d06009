/// Configuration system for sawah.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::SawahConfig::default()`]
/// 2. **User global config** — `~/.sawah/config.toml`
/// 3. **Project local config** — `.sawah.toml` in the current working directory
/// 4. **Environment variables** — `SAWAH_*` overrides (highest precedence)
///
/// A file layer replaces the layer below it; sections missing from a file
/// fall back to built-in defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use sawah::config;
///
/// let cfg = config::load();
/// let client = HttpDevice::from_config(&cfg.device);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::SawahConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved sawah configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars, then clamps values that would stall the dashboard.
pub fn load() -> SawahConfig {
    let mut config = SawahConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    apply_env_overrides(&mut config);
    sanitize(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Malformed files are ignored so a typo never keeps the dashboard from
/// starting; `sawah health` reports which files were found.
fn load_toml_file(path: Option<PathBuf>) -> Option<SawahConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Each file is deserialized with defaults for unset keys, so the overlay
/// replaces the base wholesale.
fn merge_config(base: &mut SawahConfig, overlay: &SawahConfig) {
    *base = overlay.clone();
}

/// Keep values inside the range the dashboard can work with.
fn sanitize(config: &mut SawahConfig) {
    config.poll.interval_ms = config.poll.interval_ms.max(100);
    config.poll.backoff_max_ms = config.poll.backoff_max_ms.max(config.poll.interval_ms);
    config.chart.window = config.chart.window.max(1);
    if config.gate.warning_level_cm > config.gate.emergency_level_cm {
        config.gate.warning_level_cm = config.gate.emergency_level_cm;
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config and the event log.
///
/// `SAWAH_HOME` overrides the default `~/.sawah`.
pub fn sawah_home() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SAWAH_HOME")
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(".sawah"))
}

fn global_config_path() -> Option<PathBuf> {
    sawah_home().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".sawah.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SAWAH_DEVICE_URL` — device base URL
/// - `SAWAH_DEVICE_TIMEOUT_MS` — per-request timeout
/// - `SAWAH_POLL_INTERVAL_MS` — live dashboard refresh interval
/// - `SAWAH_RETRY` — `fixed` or `backoff`
/// - `SAWAH_WEB_ADDR` — listen address of `sawah web`
/// - `SAWAH_OPEN_BROWSER` — `1`/`true`/`yes`/`on` to open the browser
/// - `SAWAH_SIMULATOR_ADDR` — listen address of `sawah simulate`
fn apply_env_overrides(config: &mut SawahConfig) {
    if let Ok(val) = std::env::var("SAWAH_DEVICE_URL")
        && !val.is_empty()
    {
        config.device.base_url = val;
    }
    if let Ok(val) = std::env::var("SAWAH_DEVICE_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.device.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("SAWAH_POLL_INTERVAL_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.poll.interval_ms = ms;
    }
    if let Ok(val) = std::env::var("SAWAH_RETRY")
        && let Some(policy) = parse_retry(&val)
    {
        config.poll.retry = policy;
    }
    if let Ok(val) = std::env::var("SAWAH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("SAWAH_OPEN_BROWSER") {
        config.web.open_browser = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("SAWAH_SIMULATOR_ADDR")
        && !val.is_empty()
    {
        config.simulator.addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a retry policy string.
fn parse_retry(val: &str) -> Option<schema::RetryPolicy> {
    match val.to_ascii_lowercase().as_str() {
        "fixed" => Some(schema::RetryPolicy::Fixed),
        "backoff" => Some(schema::RetryPolicy::Backoff),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.sawah/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.sawah/ directory")?;
    }

    fs::write(&path, SawahConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `poll.interval_ms`. A missing file is seeded
/// with the defaults first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&SawahConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject values the schema cannot load back.
    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<SawahConfig>(&output)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let existing = table
        .get(leaf)
        .with_context(|| format!("config key not found: '{key}'"))?;

    let new_value = match existing {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected number for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
