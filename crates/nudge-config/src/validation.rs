//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Longest accepted pause between scheduler ticks
pub const MAX_TICK_INTERVAL_SECONDS: u64 = 86_400;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("scheduler.tick_interval_seconds must be between 1 and {max}, got {value}")]
    TickIntervalOutOfRange { value: u64, max: u64 },

    #[error("service.data_dir cannot be empty")]
    EmptyDataDir,
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(tick) = config.scheduler.tick_interval_seconds
        && (tick == 0 || tick > MAX_TICK_INTERVAL_SECONDS)
    {
        errors.push(ValidationError::TickIntervalOutOfRange {
            value: tick,
            max: MAX_TICK_INTERVAL_SECONDS,
        });
    }

    if let Some(dir) = &config.service.data_dir
        && dir.as_os_str().is_empty()
    {
        errors.push(ValidationError::EmptyDataDir);
    }

    errors
}
