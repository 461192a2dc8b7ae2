//! Basic type definitions for the signaling relay
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: UUID-based identity of one WebSocket connection
//! - `ChannelId`: 10-character alphanumeric channel identifier
//! - `ClientId`: 10-character alphanumeric identifier, unique within a channel

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default length of generated channel and client IDs
pub const ID_LENGTH: usize = 10;

/// Generate a random identifier of `length` characters
///
/// Characters are drawn uniformly, with replacement, from the 62-character
/// alphanumeric alphabet (`A-Z`, `a-z`, `0-9`). Uniqueness is the caller's
/// concern.
pub fn generate_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Identity of a single WebSocket connection (newtype pattern)
///
/// Connections are compared by this handle only, never by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel identifier
///
/// Matched by exact string comparison: no case folding, no trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Generate a new random channel ID
    pub fn generate() -> Self {
        Self(generate_id(ID_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client identifier, scoped to its owning channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Generate a new random client ID
    pub fn generate() -> Self {
        Self(generate_id(ID_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
