//! Error types for nudge

use thiserror::Error;

use crate::ReminderId;

/// Core error type for reminder operations
#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Reminder not found: {0}")]
    NotFound(ReminderId),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl NudgeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

pub type NudgeResult<T> = std::result::Result<T, NudgeError>;
