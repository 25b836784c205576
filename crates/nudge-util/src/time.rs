//! Time utilities for nudge
//!
//! Every reminder instant is expressed in one fixed civil offset (UTC+3).
//! There is no DST handling: a reminder date and time are combined with the
//! same offset everywhere readiness is evaluated.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `NUDGE_MOCK_TIME` environment variable can be set
//! to override the service clock. The value is read in the service offset.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! NUDGE_MOCK_TIME="2025-12-25 14:30:00" nudged tick
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "NUDGE_MOCK_TIME";

/// Offset of the service clock from UTC, in hours
pub const FIXED_OFFSET_HOURS: i32 = 3;

const FIXED_OFFSET_SECONDS: i32 = FIXED_OFFSET_HOURS * 3600;

/// Format used for mock time and operator input
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached offset between mock time and real time at process start.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, DATETIME_FORMAT)
                    .ok()
                    .and_then(in_service_offset)
                {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = DATETIME_FORMAT,
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// The fixed UTC+3 offset used for all reminder instants.
pub fn fixed_offset() -> FixedOffset {
    FixedOffset::east_opt(FIXED_OFFSET_SECONDS).expect("UTC+3 is within the valid offset range")
}

/// Current time in the service offset, respecting mock time in debug builds.
pub fn now() -> DateTime<FixedOffset> {
    let real_now = Utc::now().with_timezone(&fixed_offset());

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Current calendar date in the service offset.
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Interpret a naive civil datetime in the service offset.
///
/// `None` when the matching UTC instant falls before the start of the
/// supported calendar range.
pub fn in_service_offset(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    let utc = naive.checked_sub_signed(chrono::Duration::seconds(i64::from(FIXED_OFFSET_SECONDS)))?;
    Some(DateTime::from_naive_utc_and_offset(utc, fixed_offset()))
}

/// Combine a reminder date and time into an instant in the service offset.
pub fn combine(date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
    in_service_offset(date.and_time(time))
}

/// Format a date for notification text.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a time of day for notification text.
pub fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
