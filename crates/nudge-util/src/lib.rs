//! Shared utilities for nudge
//!
//! This crate provides:
//! - ID types (ReminderId, OwnerId)
//! - Time utilities (the fixed UTC+3 service clock)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
