/// Sliding-window data for the live chart.
///
/// Two series (moisture %, water level cm) share one label axis. Once the
/// window is full every push evicts the oldest label and the oldest point of
/// both series, so all three always have the same length.
use std::collections::VecDeque;

use serde::Serialize;

use crate::config::schema::ChartConfig;

/// Suggested vertical ranges of the two axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartAxes {
    pub moisture_max: f64,
    pub level_max: f64,
}

impl ChartAxes {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            moisture_max: config.moisture_axis_max,
            level_max: config.level_axis_max,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartWindow {
    capacity: usize,
    labels: VecDeque<String>,
    moisture: VecDeque<f64>,
    level: VecDeque<f64>,
}

impl ChartWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            labels: VecDeque::with_capacity(capacity + 1),
            moisture: VecDeque::with_capacity(capacity + 1),
            level: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append one point; evicts the oldest when over capacity.
    pub fn push(&mut self, label: impl Into<String>, moisture: f64, level: f64) {
        self.labels.push_back(label.into());
        self.moisture.push_back(moisture);
        self.level.push_back(level);

        if self.labels.len() > self.capacity {
            self.labels.pop_front();
            self.moisture.pop_front();
            self.level.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn labels(&self) -> &VecDeque<String> {
        &self.labels
    }

    pub fn moisture(&self) -> &VecDeque<f64> {
        &self.moisture
    }

    pub fn level(&self) -> &VecDeque<f64> {
        &self.level
    }
}
