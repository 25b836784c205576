//! Mock collaborators for unit/integration testing

use async_trait::async_trait;
use nudge_util::OwnerId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::{AiResponder, AiRole, DeliveryError, DeliveryResult, Notifier};

/// A message captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub owner: OwnerId,
    pub text: String,
}

/// Notifier that records every delivery in memory
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentMessage>>>,

    /// Configure send to fail
    fail_send: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.fail_send.store(failing, Ordering::SeqCst);
    }

    /// Messages delivered so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Messages delivered to one owner
    pub fn sent_to(&self, owner: OwnerId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|m| m.owner == owner)
            .map(|m| m.text)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, owner: OwnerId, text: &str) -> DeliveryResult<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(DeliveryError::SendFailed("Mock send failure".into()));
        }

        self.sent
            .lock()
            .map_err(|_| DeliveryError::Internal("mock lock poisoned".into()))?
            .push(SentMessage {
                owner,
                text: text.to_string(),
            });
        Ok(())
    }
}

/// A prompt captured by [`ScriptedResponder`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCall {
    pub prompt: String,
    pub owner: OwnerId,
    pub role: AiRole,
}

/// AI responder returning a fixed reply, or a provider error
pub struct ScriptedResponder {
    reply: Result<String, String>,
    calls: Arc<Mutex<Vec<PromptCall>>>,
}

impl ScriptedResponder {
    /// Always answer with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always fail with a provider error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<PromptCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AiResponder for ScriptedResponder {
    async fn respond(&self, prompt: &str, owner: OwnerId, role: AiRole) -> DeliveryResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(PromptCall {
                prompt: prompt.to_string(),
                owner,
                role,
            });
        }

        self.reply.clone().map_err(DeliveryError::Provider)
    }
}
