//! Transcript management
//!
//! The append-only message history of one team run. The team loop is the
//! only writer; schedulers, agents and termination conditions read it.

use serde::{Deserialize, Serialize};

use crate::core::{ChatMessage, Message};

/// Ordered, append-only history of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create a transcript seeded with the caller's task
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::task(task)],
        }
    }

    /// Append a message and return it
    ///
    /// The sequence number is the message's position in the transcript.
    pub fn push(&mut self, source: impl Into<String>, content: impl Into<String>) -> &Message {
        let sequence = self.messages.len() as u64;
        self.messages.push(Message::new(source, content, sequence));
        &self.messages[self.messages.len() - 1]
    }

    /// All messages, seed first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate over messages in order
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Total message count, seed included
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// A seeded transcript is never empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of agent-produced messages (completed turns)
    pub fn turns(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_from_user()).count()
    }

    /// Get the most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Name of the agent that produced the latest turn, if any
    pub fn last_speaker(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| !m.is_from_user())
            .map(|m| m.source.as_str())
    }

    /// Whether any message contains the token verbatim
    pub fn contains_token(&self, token: &str) -> bool {
        self.messages.iter().any(|m| m.content.contains(token))
    }

    /// Map the transcript into chat messages as seen by one participant
    ///
    /// The participant's own messages become `assistant` turns; everyone
    /// else, the caller included, speaks as a named `user`.
    pub fn to_chat_messages(&self, perspective: &str) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|m| {
                if m.source == perspective {
                    ChatMessage::assistant(&m.content)
                } else {
                    ChatMessage::user(&m.content).with_name(&m.source)
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
