/// Session history kept by the simulator for `GET /analysis`.
use crate::device::{AnalysisSnapshot, Reading};

use super::field::round1;

pub const EMPTY_HISTORY_ERROR: &str = "No data to analyse yet.";

#[derive(Debug, Clone)]
pub struct SessionHistory {
    records: Vec<Reading>,
    cycle_seconds: u64,
}

impl SessionHistory {
    pub fn new(cycle_seconds: u64) -> Self {
        Self {
            records: Vec::new(),
            cycle_seconds,
        }
    }

    /// Append a reading. The history is never trimmed; it grows for the
    /// life of the process so `/analysis` always covers the whole session.
    pub fn add(&mut self, reading: Reading) {
        self.records.push(reading);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate the session, or `None` before the first reading.
    ///
    /// Pump-on time counts every cycle that reported ON as one full cycle.
    pub fn summary(&self) -> Option<AnalysisSnapshot> {
        if self.records.is_empty() {
            return None;
        }

        let count = self.records.len() as f64;
        let on_cycles = self
            .records
            .iter()
            .filter(|r| r.pump_state.is_on())
            .count() as u64;

        let moisture = self.records.iter().map(|r| r.moisture);
        let level = self.records.iter().map(|r| r.level);

        Some(AnalysisSnapshot {
            total_pump_on_time_seconds: (on_cycles * self.cycle_seconds) as f64,
            total_records: self.records.len() as u64,
            avg_moisture: round1(moisture.clone().sum::<f64>() / count),
            max_moisture: moisture.clone().fold(f64::MIN, f64::max),
            min_moisture: moisture.fold(f64::MAX, f64::min),
            avg_level: round1(level.clone().sum::<f64>() / count),
            max_level: level.clone().fold(f64::MIN, f64::max),
            min_level: level.fold(f64::MAX, f64::min),
        })
    }
}
