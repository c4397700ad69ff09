//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_RANK_TIMEOUT: Duration = Duration::from_secs(2);

/// Runtime configuration of an [`AssignmentEngine`](crate::AssignmentEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum jobs per flush; the engine treats zero as one.
    pub batch_size: usize,
    /// Period of the recurring flush; zero disables the timer.
    pub flush_interval: Duration,
    /// Upper bound for a single ranking call.
    pub rank_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            rank_timeout: DEFAULT_RANK_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Sets the batch size; zero is raised to one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    #[must_use]
    pub fn with_rank_timeout(mut self, rank_timeout: Duration) -> Self {
        self.rank_timeout = rank_timeout;
        self
    }

    pub fn timer_enabled(&self) -> bool {
        !self.flush_interval.is_zero()
    }
}

/// Serialized engine settings, durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub rank_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineConfig::default().into()
    }
}

impl From<EngineSettings> for EngineConfig {
    fn from(settings: EngineSettings) -> Self {
        EngineConfig::default()
            .with_batch_size(settings.batch_size)
            .with_flush_interval(Duration::from_millis(settings.flush_interval_ms))
            .with_rank_timeout(Duration::from_millis(settings.rank_timeout_ms))
    }
}

impl From<EngineConfig> for EngineSettings {
    fn from(config: EngineConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            flush_interval_ms: u64::try_from(config.flush_interval.as_millis()).unwrap_or(u64::MAX),
            rank_timeout_ms: u64::try_from(config.rank_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: EngineSettings = serde_json::from_str(r#"{ "batch_size": 4 }"#).unwrap();
        let config = EngineConfig::from(settings);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.flush_interval, DEFAULT_FLUSH_INTERVAL);
        assert_eq!(config.rank_timeout, DEFAULT_RANK_TIMEOUT);
    }

    #[test]
    fn zero_batch_size_is_raised() {
        assert_eq!(EngineConfig::default().with_batch_size(0).batch_size, 1);
    }

    #[test]
    fn zero_interval_disables_timer() {
        let config = EngineConfig::default().with_flush_interval(Duration::ZERO);
        assert!(!config.timer_enabled());
        assert!(EngineConfig::default().timer_enabled());
    }
}
