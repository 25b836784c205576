//! Persona set for AI-backed reminders

use serde::{Deserialize, Serialize};
use std::fmt;

/// Persona the AI responder adopts when answering a reminder's prompt.
///
/// Unrecognized role names decode to [`AiRole::Assistant`] rather than
/// failing, so records written with a retired role still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AiRole {
    #[default]
    Assistant,
    Scientist,
    Creative,
    Developer,
}

impl AiRole {
    pub const ALL: [AiRole; 4] = [
        AiRole::Assistant,
        AiRole::Scientist,
        AiRole::Creative,
        AiRole::Developer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiRole::Assistant => "assistant",
            AiRole::Scientist => "scientist",
            AiRole::Creative => "creative",
            AiRole::Developer => "developer",
        }
    }

    /// Parse a role name, falling back to the default role
    pub fn parse_or_default(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "scientist" => AiRole::Scientist,
            "creative" => AiRole::Creative,
            "developer" => AiRole::Developer,
            _ => AiRole::Assistant,
        }
    }
}

impl fmt::Display for AiRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AiRole {
    fn from(name: String) -> Self {
        Self::parse_or_default(&name)
    }
}

impl From<AiRole> for String {
    fn from(role: AiRole) -> Self {
        role.as_str().to_string()
    }
}
