//! Shared types used across Agora modules
//!
//! Contains the transcript message record and the chat message format
//! handed to model providers.

use serde::{Deserialize, Serialize};

/// Source name reserved for the caller's seeded task message
pub const USER_SOURCE: &str = "user";

/// A message in a team transcript
///
/// Messages are immutable once appended; the sequence number is assigned
/// by the transcript at append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the agent (or `"user"`) that produced this message
    pub source: String,
    /// Text content of the message
    pub content: String,
    /// Position in the transcript, starting at 0 for the task
    pub sequence: u64,
}

impl Message {
    /// Create a new message
    pub fn new(source: impl Into<String>, content: impl Into<String>, sequence: u64) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            sequence,
        }
    }

    /// Create the seeded task message attributed to the caller
    pub fn task(content: impl Into<String>) -> Self {
        Self::new(USER_SOURCE, content, 0)
    }

    /// Whether this message was written by the caller rather than an agent
    pub fn is_from_user(&self) -> bool {
        self.source == USER_SOURCE
    }
}

/// A message in the chat format understood by model providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Optional participant name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            name: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            name: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            name: None,
        }
    }

    /// Attach a participant name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
