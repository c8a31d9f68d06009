/// Terminal rendering of the live dashboard (`sawah watch`).
///
/// Each cycle redraws the whole screen: value cards, pump indicator, the ON
/// control state, two sparklines for the chart window and the log line.
use colored::{ColoredString, Colorize};

use super::chart::{ChartAxes, ChartWindow};
use super::gate::ButtonGate;
use super::{LiveView, ReadingView};
use crate::device::PumpState;

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct TerminalView {
    axes: ChartAxes,
    clear_screen: bool,
    reading: Option<ReadingView>,
    gate: ButtonGate,
    moisture_line: String,
    level_line: String,
    status: Option<String>,
    notice: Option<String>,
}

impl TerminalView {
    pub fn new(axes: ChartAxes, clear_screen: bool) -> Self {
        Self {
            axes,
            clear_screen,
            reading: None,
            gate: ButtonGate::OPEN,
            moisture_line: String::new(),
            level_line: String::new(),
            status: None,
            notice: None,
        }
    }

    fn render_screen(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", "sawah — Live Irrigation Dashboard".bold().cyan()));
        out.push_str(&format!("{}\n", "=".repeat(56)));

        match &self.reading {
            Some(r) => {
                out.push_str(&format!("  {} {}\n", "Soil moisture:".bold(), r.moisture_text));
                out.push_str(&format!(
                    "  {} {}\n",
                    "Category:     ".bold(),
                    colorize_category(&r.category_class, &r.category_label)
                ));
                out.push_str(&format!("  {} {}\n", "Water level:  ".bold(), r.level_text));
                out.push_str(&format!(
                    "  {} {}\n",
                    "Pump:         ".bold(),
                    pump_indicator(r.pump_state)
                ));
            }
            None => out.push_str(&format!("  {}\n", "Waiting for the first reading…".dimmed())),
        }

        out.push_str(&format!("  {} {}\n", "ON control:   ".bold(), gate_label(&self.gate)));
        out.push('\n');

        out.push_str(&format!("{}\n", "Last readings".bold().cyan()));
        out.push_str(&format!(
            "  {:<12} {}\n",
            "moisture %",
            self.moisture_line.blue()
        ));
        out.push_str(&format!(
            "  {:<12} {}\n",
            "level cm",
            self.level_line.cyan()
        ));
        out.push('\n');

        match (&self.status, &self.reading) {
            (Some(status), _) => out.push_str(&format!("  {}\n", status.red())),
            (None, Some(r)) => out.push_str(&format!("  {}\n", r.log_text.dimmed())),
            (None, None) => {}
        }
        if let Some(notice) = &self.notice {
            out.push_str(&format!("  {} {}\n", "!".yellow().bold(), notice.yellow()));
        }

        out.push('\n');
        out.push_str(&format!(
            "  {}\n",
            "Type `on` / `off` + Enter to switch the pump, `r` to refresh, `q` to quit.".dimmed()
        ));
        out
    }
}

impl LiveView for TerminalView {
    fn render_reading(&mut self, reading: &ReadingView) {
        self.reading = Some(reading.clone());
        self.status = None;
    }

    fn render_gate(&mut self, gate: &ButtonGate) {
        self.gate = *gate;
    }

    fn render_chart(&mut self, chart: &ChartWindow) {
        self.moisture_line = sparkline(chart.moisture().iter().copied(), self.axes.moisture_max);
        self.level_line = sparkline(chart.level().iter().copied(), self.axes.level_max);
    }

    fn render_poll_error(&mut self, message: &str) {
        self.status = Some(message.to_string());
    }

    fn render_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    fn present(&mut self) {
        if self.clear_screen {
            print!("\x1B[2J\x1B[H");
        }
        print!("{}", self.render_screen());
        self.notice = None;
    }
}

/// Render values as block characters scaled to `0..=suggested_max`.
///
/// Like a suggested axis range, the scale grows when a value exceeds it.
pub fn sparkline(values: impl Iterator<Item = f64> + Clone, suggested_max: f64) -> String {
    let max = values
        .clone()
        .fold(suggested_max, |acc, v| if v > acc { v } else { acc });
    let last = SPARK_BLOCKS.len() - 1;

    values
        .map(|v| {
            if max <= 0.0 || !v.is_finite() {
                return SPARK_BLOCKS[0];
            }
            let ratio = (v / max).clamp(0.0, 1.0);
            SPARK_BLOCKS[(ratio * last as f64).round() as usize]
        })
        .collect()
}

fn pump_indicator(state: PumpState) -> ColoredString {
    match state {
        PumpState::On => "● ON".green().bold(),
        PumpState::Off => "○ OFF".red().bold(),
    }
}

fn gate_label(gate: &ButtonGate) -> ColoredString {
    if gate.disabled {
        format!("disabled — {}", gate.tooltip).red()
    } else if gate.warning {
        format!("warning — {}", gate.tooltip).yellow()
    } else {
        "available".green()
    }
}

fn colorize_category(class: &str, label: &str) -> ColoredString {
    match class {
        "sangat-kering" => label.red(),
        "kering" => label.yellow(),
        "lembab" => label.green(),
        "basah" => label.cyan(),
        "sangat-basah" => label.blue(),
        _ => label.normal(),
    }
}
