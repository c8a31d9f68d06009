//! CLI command implementations for sawah.
//!
//! Provides subcommand handlers for:
//! - `sawah watch` — live dashboard in the terminal
//! - `sawah pump on|off` — one manual pump command
//! - `sawah analysis` — daily analysis, CSV export, printable report
//! - `sawah web` — browser dashboard
//! - `sawah simulate` — device simulator
//! - `sawah health` — config files, device reachability, event log
//! - `sawah events` — tail of the event log
//! - `sawah config show|init|set|reset` — configuration management

use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Result, bail};
use colored::Colorize;

use crate::analysis::terminal::{OutputFormat, TerminalAnalysisView};
use crate::analysis::{AnalysisPage, ExportOutcome};
use crate::config;
use crate::dashboard::chart::ChartAxes;
use crate::dashboard::terminal::TerminalView;
use crate::dashboard::{self, ControlOutcome, LiveDashboard, LiveView, WatchInput};
use crate::device::{AnalysisResponse, Device, HttpDevice, PumpCommand};
use crate::events;
use crate::simulator;
use crate::web;

// ---------------------------------------------------------------------------
// sawah watch
// ---------------------------------------------------------------------------

/// Run the live dashboard in the terminal until `q` or `count` polls.
pub fn run_watch(count: Option<u64>) -> Result<()> {
    let cfg = config::load();
    let device = HttpDevice::from_config(&cfg.device);
    let mut dashboard = LiveDashboard::new(&cfg);
    let interactive = std::io::stdout().is_terminal();
    let mut view = TerminalView::new(ChartAxes::from_config(&cfg.chart), interactive);

    println!(
        "{} watching {} every {} ms ({} retry)",
        "sawah".bold().green(),
        device.base_url(),
        cfg.poll.interval_ms,
        cfg.poll.retry
    );
    println!(
        "  {}",
        "Type `on`, `off`, `r` (refresh) or `q` (quit) and press Enter.".dimmed()
    );

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match WatchInput::parse(&line) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None => eprintln!("{} unknown input: {}", "?".yellow(), line.trim()),
            }
        }
    });

    dashboard::watch(&mut dashboard, &device, &mut view, &rx, count);
    Ok(())
}

// ---------------------------------------------------------------------------
// sawah pump on|off
// ---------------------------------------------------------------------------

/// Send one manual command. The latest reading is fetched first so the ON
/// gate reflects the current water level.
pub fn run_pump(command: PumpCommand) -> Result<()> {
    let cfg = config::load();
    let device = HttpDevice::from_config(&cfg.device);
    let mut dashboard = LiveDashboard::new(&cfg);
    let mut view = TerminalView::new(ChartAxes::from_config(&cfg.chart), false);

    dashboard.poll(&device, &mut view);

    match dashboard.control(&device, &mut view, command) {
        ControlOutcome::Sent => {
            view.present();
            println!("{} pump set to {}", "✓".green().bold(), command);
            Ok(())
        }
        ControlOutcome::Refused => {
            view.present();
            bail!("pump {command} refused: {}", dashboard.gate().tooltip)
        }
        ControlOutcome::Failed => bail!("could not send pump {command} to {}", device.base_url()),
    }
}

// ---------------------------------------------------------------------------
// sawah analysis
// ---------------------------------------------------------------------------

/// Show the daily analysis; optionally export it as CSV and print it.
///
/// `export` is `Some(None)` for `--export` without a path, which writes to
/// the configured export directory.
pub fn run_analysis(format: OutputFormat, export: Option<Option<PathBuf>>, print: bool) -> Result<()> {
    let cfg = config::load();
    let device = HttpDevice::from_config(&cfg.device);
    let mut page = AnalysisPage::new(&cfg);

    let target = match &export {
        Some(Some(path)) => path.clone(),
        _ => PathBuf::from(&cfg.export.directory),
    };
    let mut view = TerminalAnalysisView::new(format, target);

    page.load(&device, &mut view);

    if export.is_some() {
        // A failed load leaves nothing cached; export then alerts and refetches.
        if let ExportOutcome::Refetched(_) = page.export(&device, &mut view)? {
            bail!("no analysis available to export");
        }
    }

    if print {
        page.print(&mut view);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// sawah web / sawah simulate
// ---------------------------------------------------------------------------

/// Serve the browser dashboard.
pub fn run_web(addr: Option<String>, no_open: bool) -> Result<()> {
    let mut cfg = config::load();
    if let Some(addr) = addr {
        cfg.web.addr = addr;
    }
    let open = cfg.web.open_browser && !no_open;
    web::serve(&cfg, open)
}

/// Run the device simulator in the foreground.
pub fn run_simulate(addr: Option<String>, seed: Option<u64>) -> Result<()> {
    let mut cfg = config::load();
    if let Some(addr) = addr {
        cfg.simulator.addr = addr;
    }

    let server = simulator::bind(&cfg.simulator, seed)?;
    let shown = server
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| cfg.simulator.addr.clone());

    println!("{} simulator listening on http://{shown}", "sawah".bold().green());
    println!("  GET /data · POST /control · GET /analysis");
    if let Some(seed) = seed {
        println!("  {}", format!("seed {seed}").dimmed());
    }
    println!("Press Ctrl+C to stop.\n");

    server.run();
    Ok(())
}

// ---------------------------------------------------------------------------
// sawah health
// ---------------------------------------------------------------------------

/// Check config files, device reachability and the event log.
pub fn run_health() -> Result<()> {
    println!("{}", "sawah Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.sawah/config.toml found"
        } else {
            "not found (run `sawah config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".sawah.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item(
        "Poll",
        true,
        &format!("every {} ms, {} retry", cfg.poll.interval_ms, cfg.poll.retry),
    );

    // `/analysis` is read-only on the device; `/data` would advance a cycle.
    let device = HttpDevice::from_config(&cfg.device);
    let (device_ok, device_detail) = match device.fetch_analysis() {
        Ok(AnalysisResponse::Ready(s)) => (
            true,
            format!("reachable at {} ({} records)", device.base_url(), s.total_records),
        ),
        Ok(AnalysisResponse::Unavailable(_)) => (
            true,
            format!("reachable at {} (no data yet)", device.base_url()),
        ),
        Err(_) => (
            false,
            format!("not reachable at {} — is the device running?", device.base_url()),
        ),
    };
    print_health_item("Device", device_ok, &device_detail);

    let log_exists = events::events_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_entries = if log_exists {
        events::read_all_entries().len()
    } else {
        0
    };
    print_health_item(
        "Event log",
        log_exists,
        &if log_exists {
            format!("{log_entries} entries")
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// sawah events
// ---------------------------------------------------------------------------

/// Print the last `limit` events, oldest first.
pub fn run_events(limit: usize) -> Result<()> {
    let entries = events::read_recent(limit);
    if entries.is_empty() {
        println!("{}", "No events recorded yet.".yellow());
        return Ok(());
    }

    for entry in entries {
        let kind = format!("{:<22}", entry.kind.to_string());
        let kind = if entry.kind.is_error() {
            kind.red()
        } else {
            kind.green()
        };
        println!("{}  {}  {}", entry.timestamp.dimmed(), kind, entry.message);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// sawah config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective sawah Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.sawah/config.toml");
    print_source(project_exists, ".sawah.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "SAWAH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.sawah/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point sawah at your device.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
