//! Strongly-typed identifiers for nudge

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a reminder record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderId(Uuid);

impl ReminderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Storage key for this reminder
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ReminderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReminderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of the user who owns a reminder (the chat user id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Storage key for this owner's index entries
    pub fn key(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_id_uniqueness() {
        let a = ReminderId::new();
        let b = ReminderId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn reminder_id_parses_its_own_key() {
        let id = ReminderId::new();
        let parsed: ReminderId = id.key().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<ReminderId>().is_err());
    }

    #[test]
    fn owner_id_serializes_as_plain_integer() {
        let owner = OwnerId::new(42);
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(json, "42");

        let parsed: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, owner);
        assert_eq!(owner.key(), "42");
    }
}
