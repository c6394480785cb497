//! Team run state management
//!
//! Tracks where a team is in its lifecycle and what a finished run produced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::transcript::Transcript;
use crate::core::{AgoraError, Message, Result};

/// Lifecycle of a team run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Constructed, not yet started
    Idle,
    /// Turns are being taken
    Running,
    /// Stopped normally by the termination condition or turn cap
    Terminal,
    /// Stopped by an external cancellation signal
    Cancelled,
    /// Stopped by an agent or scheduler error
    Failed,
}

impl RunState {
    /// Whether the run is over, one way or another
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Terminal | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Terminal => write!(f, "terminal"),
            RunState::Cancelled => write!(f, "cancelled"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Turn bookkeeping for the conversation loop
#[derive(Debug, Clone)]
pub struct LoopState {
    /// Completed turns
    pub turn: usize,
    /// Hard cap on turns, if any
    pub max_turns: Option<usize>,
}

impl LoopState {
    /// Create a new loop state with the given turn cap
    pub fn new(max_turns: Option<usize>) -> Self {
        Self { turn: 0, max_turns }
    }

    /// Check whether the turn cap has been hit
    pub fn turn_limit_reached(&self) -> bool {
        self.max_turns.is_some_and(|max| self.turn >= max)
    }

    /// Increment the turn counter
    pub fn next_turn(&mut self) {
        self.turn += 1;
    }
}

/// Outcome of one team run
///
/// The transcript is always present, including for cancelled and failed
/// runs, where it holds every turn completed before the stop.
#[derive(Debug)]
pub struct TaskResult {
    /// Messages produced during the run, seed first
    pub transcript: Transcript,
    /// Final state: terminal, cancelled or failed
    pub state: RunState,
    /// Why the run stopped
    pub stop_reason: Option<String>,
    /// The error that stopped a failed run
    pub error: Option<AgoraError>,
}

impl TaskResult {
    pub(crate) fn terminal(transcript: Transcript, reason: impl Into<String>) -> Self {
        Self {
            transcript,
            state: RunState::Terminal,
            stop_reason: Some(reason.into()),
            error: None,
        }
    }

    pub(crate) fn cancelled(transcript: Transcript) -> Self {
        Self {
            transcript,
            state: RunState::Cancelled,
            stop_reason: Some("Cancelled".to_string()),
            error: None,
        }
    }

    pub(crate) fn failed(transcript: Transcript, error: AgoraError) -> Self {
        Self {
            transcript,
            state: RunState::Failed,
            stop_reason: Some(error.to_string()),
            error: Some(error),
        }
    }

    /// Messages in order
    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn is_terminal(&self) -> bool {
        self.state == RunState::Terminal
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }

    pub fn is_failed(&self) -> bool {
        self.state == RunState::Failed
    }

    /// Convert to a plain result, dropping the partial transcript on failure
    pub fn into_result(self) -> Result<Transcript> {
        match self.state {
            RunState::Cancelled => Err(AgoraError::Cancelled),
            RunState::Failed => Err(self
                .error
                .unwrap_or_else(|| AgoraError::Other("run failed".to_string()))),
            _ => Ok(self.transcript),
        }
    }
}
