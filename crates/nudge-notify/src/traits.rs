//! Delivery collaborator traits

use async_trait::async_trait;
use nudge_util::OwnerId;
use thiserror::Error;

use crate::AiRole;

/// Errors from delivery collaborators
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Sends text to a user over whatever transport the application uses
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, owner: OwnerId, text: &str) -> DeliveryResult<()>;
}

/// Produces an AI answer for a reminder prompt at fire time
#[async_trait]
pub trait AiResponder: Send + Sync {
    async fn respond(&self, prompt: &str, owner: OwnerId, role: AiRole) -> DeliveryResult<String>;
}
