//! Scheduler module - who speaks next
//!
//! A scheduler picks the roster index of the next speaker after every turn.
//! Round-robin cycles through the roster; the selector asks a decision
//! service.

pub mod round_robin;
pub mod selector;

pub use round_robin::RoundRobinScheduler;
pub use selector::{
    resolve_selection, DecisionService, ModelDecisionService, Participant, SelectionRequest,
    SelectorScheduler,
};

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::{Agent, Transcript};
use crate::core::{Config, Result, SchedulerKind};
use crate::llm::LLMProvider;

/// Hand-off policy between team members
#[async_trait]
pub trait Scheduler: Send {
    /// Pick the index into `roster` of the agent that speaks next
    async fn next(&mut self, roster: &[Agent], transcript: &Transcript) -> Result<usize>;

    /// Get the scheduler name
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    async fn next(&mut self, roster: &[Agent], transcript: &Transcript) -> Result<usize> {
        (**self).next(roster, transcript).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Build the configured hand-off policy
///
/// The selector consults the provider through a [`ModelDecisionService`]
/// on the configured selector model.
pub fn build_scheduler(config: &Config, provider: Arc<dyn LLMProvider>) -> Box<dyn Scheduler> {
    match config.team.scheduler {
        SchedulerKind::RoundRobin => Box::new(RoundRobinScheduler::new()),
        SchedulerKind::Selector => Box::new(SelectorScheduler::new(ModelDecisionService::new(
            provider,
            config.selector_model(),
        ))),
    }
}
