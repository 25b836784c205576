//! Collaborators used by the standalone service

use async_trait::async_trait;
use nudge_notify::{AiResponder, AiRole, DeliveryError, DeliveryResult, Notifier};
use nudge_util::OwnerId;
use std::io::Write;
use tracing::debug;

/// Prints every delivery to stdout, one framed block per message
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, owner: OwnerId, text: &str) -> DeliveryResult<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "--- to {owner} ---\n{text}\n")
            .and_then(|_| out.flush())
            .map_err(|e| DeliveryError::SendFailed(e.to_string()))
    }
}

/// Stand-in until an AI provider is wired in; every request fails
pub struct UnconfiguredResponder;

#[async_trait]
impl AiResponder for UnconfiguredResponder {
    async fn respond(&self, _prompt: &str, owner: OwnerId, role: AiRole) -> DeliveryResult<String> {
        debug!(owner_id = %owner, role = %role, "AI request with no provider configured");
        Err(DeliveryError::Provider("no AI provider configured".into()))
    }
}
