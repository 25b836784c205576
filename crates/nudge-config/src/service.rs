//! Validated configuration structures

use crate::schema::RawConfig;
use nudge_util::default_data_dir;
use std::path::PathBuf;
use std::time::Duration;

/// Default pause between scheduler ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Validated configuration ready for use by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Directory holding the store database
    pub data_dir: PathBuf,

    pub scheduler: SchedulerConfig,
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Pause between the end of one tick and the start of the next
    pub tick_interval: Duration,
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            enabled: true,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            data_dir: raw.service.data_dir.unwrap_or_else(default_data_dir),
            scheduler: SchedulerConfig {
                tick_interval: raw
                    .scheduler
                    .tick_interval_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TICK_INTERVAL),
                enabled: raw.scheduler.enabled.unwrap_or(true),
            },
        }
    }

    /// Path of the SQLite database inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(nudge_util::DATABASE_FILENAME)
    }
}
