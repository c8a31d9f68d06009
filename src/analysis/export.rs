/// CSV export of an analysis snapshot.
///
/// Layout: one header row and eight metric rows, `;` as delimiter, CRLF line
/// endings, decimal commas (`45,5`) so spreadsheet software in an Indonesian
/// locale reads the numbers as numbers.
use anyhow::{Context, Result};

use crate::device::AnalysisSnapshot;

pub const HEADER: [&str; 3] = ["Metrik", "Nilai", "Satuan"];

/// The eight exported metrics in display order: label, value, unit.
pub fn metric_rows(snapshot: &AnalysisSnapshot) -> [(&'static str, f64, &'static str); 8] {
    [
        (
            "Total Waktu Pompa Menyala",
            snapshot.total_pump_on_time_seconds,
            "detik",
        ),
        ("Total Data Tercatat", snapshot.total_records as f64, "data"),
        ("Rata-rata Kelembaban", snapshot.avg_moisture, "%"),
        ("Kelembaban Maksimum", snapshot.max_moisture, "%"),
        ("Kelembaban Minimum", snapshot.min_moisture, "%"),
        ("Rata-rata Ketinggian Air", snapshot.avg_level, "cm"),
        ("Ketinggian Air Maksimum", snapshot.max_level, "cm"),
        ("Ketinggian Air Minimum", snapshot.min_level, "cm"),
    ]
}

/// Render a number the way the device reports it, with a decimal comma.
pub fn decimal_comma(value: f64) -> String {
    value.to_string().replace('.', ",")
}

/// Build the CSV document for `snapshot`.
pub fn build_csv(snapshot: &AnalysisSnapshot) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .context("failed to write CSV header")?;

    for (label, value, unit) in metric_rows(snapshot) {
        writer
            .write_record([label, decimal_comma(value).as_str(), unit])
            .with_context(|| format!("failed to write CSV row '{label}'"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
