/// Terminal rendering of the analysis page (`sawah analysis`).
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use super::{AnalysisFields, AnalysisView};

/// How the summary is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

pub struct TerminalAnalysisView {
    format: OutputFormat,
    export_target: PathBuf,
    fields: Option<AnalysisFields>,
    written: Vec<PathBuf>,
}

impl TerminalAnalysisView {
    /// `export_target` is either a directory (the configured file name is
    /// appended) or a full file path.
    pub fn new(format: OutputFormat, export_target: PathBuf) -> Self {
        Self {
            format,
            export_target,
            fields: None,
            written: Vec::new(),
        }
    }

    /// Files written by [`AnalysisView::deliver_csv`] so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn resolve_target(&self, file_name: &str) -> PathBuf {
        resolve_export_path(&self.export_target, file_name)
    }
}

/// Directory targets (existing directories, empty paths, paths ending in a
/// separator) get `file_name` appended.
pub fn resolve_export_path(target: &Path, file_name: &str) -> PathBuf {
    let as_str = target.to_string_lossy();
    if as_str.is_empty() {
        PathBuf::from(file_name)
    } else if target.is_dir() || as_str.ends_with('/') || as_str.ends_with('\\') {
        target.join(file_name)
    } else {
        target.to_path_buf()
    }
}

impl AnalysisView for TerminalAnalysisView {
    fn render_analysis(&mut self, fields: &AnalysisFields) {
        self.fields = Some(fields.clone());
        match self.format {
            OutputFormat::Table => print_table(fields),
            OutputFormat::Json => match serde_json::to_string_pretty(fields) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("{} {e}", "failed to serialize analysis:".red()),
            },
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    fn deliver_csv(&mut self, file_name: &str, contents: &str) -> Result<()> {
        let path = self.resolve_target(file_name);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{} CSV written to {}", "✓".green().bold(), path.display());
        self.written.push(path);
        Ok(())
    }

    fn print(&mut self) {
        match &self.fields {
            Some(fields) => print!("{}", printable_report(fields)),
            None => println!("(nothing to print)"),
        }
    }
}

fn print_table(fields: &AnalysisFields) {
    println!("{}", "Daily Irrigation Analysis".bold().cyan());
    println!("{}", "=".repeat(44));
    println!("  {} {}", "Pump on time:  ".bold(), fields.total_pump_time);
    println!("  {} {}", "Records:       ".bold(), fields.total_records);
    println!();
    println!("  {:<16} {:>8} {:>8} {:>8}", "", "avg", "max", "min");
    println!("  {}", "-".repeat(42));
    println!(
        "  {:<16} {:>8} {:>8} {:>8}",
        "Moisture (%)", fields.avg_moisture, fields.max_moisture, fields.min_moisture
    );
    println!(
        "  {:<16} {:>8} {:>8} {:>8}",
        "Water level (cm)", fields.avg_level, fields.max_level, fields.min_level
    );
}

/// Plain, colour-free rendering for paper.
pub fn printable_report(fields: &AnalysisFields) -> String {
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M");
    let rows = [
        ("Total pump on time", &fields.total_pump_time),
        ("Total records", &fields.total_records),
        ("Average moisture (%)", &fields.avg_moisture),
        ("Maximum moisture (%)", &fields.max_moisture),
        ("Minimum moisture (%)", &fields.min_moisture),
        ("Average water level (cm)", &fields.avg_level),
        ("Maximum water level (cm)", &fields.max_level),
        ("Minimum water level (cm)", &fields.min_level),
    ];

    let mut out = format!("DAILY IRRIGATION ANALYSIS\nGenerated {generated}\n\n");
    for (label, value) in rows {
        out.push_str(&format!("{label:<28}{value:>14}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> AnalysisFields {
        AnalysisFields {
            total_pump_time: "120 detik".to_string(),
            total_records: "10".to_string(),
            avg_moisture: "45.5".to_string(),
            max_moisture: "80".to_string(),
            min_moisture: "20".to_string(),
            avg_level: "5.5".to_string(),
            max_level: "12".to_string(),
            min_level: "1".to_string(),
        }
    }

    #[test]
    fn export_path_resolution() {
        assert_eq!(
            resolve_export_path(Path::new(""), "a.csv"),
            PathBuf::from("a.csv")
        );
        assert_eq!(
            resolve_export_path(Path::new("out/"), "a.csv"),
            PathBuf::from("out/a.csv")
        );
        assert_eq!(
            resolve_export_path(Path::new("report.csv"), "a.csv"),
            PathBuf::from("report.csv")
        );
        let dir = std::env::temp_dir();
        assert_eq!(resolve_export_path(&dir, "a.csv"), dir.join("a.csv"));
    }

    #[test]
    fn printable_report_lists_all_fields() {
        let report = printable_report(&fields());
        assert!(report.starts_with("DAILY IRRIGATION ANALYSIS\n"));
        assert!(report.contains("120 detik"));
        assert!(report.contains("45.5"));
        assert_eq!(report.lines().count(), 3 + 8);
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
    }
}
