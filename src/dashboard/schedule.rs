/// Delay between polls under the configured retry policy.
///
/// `fixed` keeps the regular interval regardless of failures. `backoff`
/// doubles the delay for every consecutive failure, capped at
/// `backoff_max_ms`, and drops back to the interval after a success.
use std::time::Duration;

use crate::config::schema::{PollConfig, RetryPolicy};

#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    policy: RetryPolicy,
    max_delay: Duration,
    consecutive_failures: u32,
}

impl PollSchedule {
    pub fn from_config(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            policy: config.retry,
            max_delay: Duration::from_millis(config.backoff_max_ms),
            consecutive_failures: 0,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long to wait before the next poll.
    pub fn next_delay(&self) -> Duration {
        match self.policy {
            RetryPolicy::Fixed => self.interval,
            RetryPolicy::Backoff => {
                let factor = 1u32 << self.consecutive_failures.min(16);
                self.interval
                    .saturating_mul(factor)
                    .min(self.max_delay.max(self.interval))
            }
        }
    }
}
