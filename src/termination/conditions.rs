//! Primitive termination conditions

use crate::agent::Transcript;
use crate::core::{AgoraError, Result};
use crate::termination::TerminationCondition;

/// Terminal once any message contains the token verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMention {
    token: String,
}

impl TextMention {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl TerminationCondition for TextMention {
    fn check(&self, transcript: &Transcript) -> Option<String> {
        transcript
            .contains_token(&self.token)
            .then(|| format!("Text '{}' mentioned", self.token))
    }

    fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(AgoraError::config("termination token must not be empty"));
        }
        Ok(())
    }
}

/// Terminal once the agents have produced `limit` messages
///
/// The seeded task message is not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxMessages {
    limit: usize,
}

impl MaxMessages {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl TerminationCondition for MaxMessages {
    fn check(&self, transcript: &Transcript) -> Option<String> {
        let count = transcript.turns();
        (count >= self.limit).then(|| {
            format!(
                "Maximum number of messages {} reached, current message count: {}",
                self.limit, count
            )
        })
    }

    fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(AgoraError::config("max messages limit must be at least 1"));
        }
        Ok(())
    }
}
