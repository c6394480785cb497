//! Fixed cyclic hand-off

use async_trait::async_trait;

use crate::agent::{Agent, Transcript};
use crate::core::{AgoraError, Result};
use crate::scheduler::Scheduler;

/// Cycles through the roster in registration order
///
/// Turn `k` (0-indexed) goes to `k mod N`. The cursor is the number of
/// completed turns in the transcript, so the scheduler keeps no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scheduler for RoundRobinScheduler {
    async fn next(&mut self, roster: &[Agent], transcript: &Transcript) -> Result<usize> {
        if roster.is_empty() {
            return Err(AgoraError::config("team roster is empty"));
        }
        Ok(transcript.turns() % roster.len())
    }

    fn name(&self) -> &str {
        "round_robin"
    }
}
