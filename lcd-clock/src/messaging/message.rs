//! Chat message payloads carried over the broker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Random 64-bit identifier, hex encoded.
    pub id: String,
    pub user: User,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh random ID.
    #[must_use]
    pub fn new(user: User, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("{:016x}", rand::random::<u64>()),
            user,
            content: content.into(),
            created_at,
        }
    }

    /// Encode as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid message.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
