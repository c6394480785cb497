//! Team orchestrator
//!
//! Runs the turn-taking loop: ask the scheduler who speaks, invoke that
//! agent with the transcript, append the reply, check termination. Exactly
//! one scheduler decision or agent invocation is in flight at a time, and
//! both are raced against the cancellation token.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::agent::assistant::Agent;
use crate::agent::run_state::{LoopState, RunState, TaskResult};
use crate::agent::transcript::Transcript;
use crate::core::config::validate_roster;
use crate::core::{AgoraError, Config, Message, Result};
use crate::llm::LLMProvider;
use crate::scheduler::{build_scheduler, RoundRobinScheduler, Scheduler};
use crate::termination::{AnyOf, MaxMessages, TerminationCondition, TextMention};

/// Default buffer between the loop and a streaming consumer
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Something a streaming consumer observes during a run
#[derive(Debug, Clone, PartialEq)]
pub enum TeamEvent {
    /// A message was appended to the transcript
    Message(Message),
    /// The run stopped; always the last event
    Finished {
        state: RunState,
        stop_reason: Option<String>,
    },
}

/// A group of agents taking turns on one task
pub struct Team {
    agents: Vec<Agent>,
    scheduler: Box<dyn Scheduler>,
    termination: Box<dyn TerminationCondition>,
    max_turns: Option<usize>,
    channel_capacity: usize,
    state: RunState,
}

/// Builder for creating Teams
pub struct TeamBuilder {
    agents: Vec<Agent>,
    scheduler: Option<Box<dyn Scheduler>>,
    termination: Option<Box<dyn TerminationCondition>>,
    max_turns: Option<usize>,
    channel_capacity: usize,
}

impl TeamBuilder {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            scheduler: None,
            termination: None,
            max_turns: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Add an agent to the end of the roster
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents in order
    pub fn agents(mut self, agents: impl IntoIterator<Item = Agent>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Set the hand-off policy (default: round-robin)
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Set the termination condition
    pub fn termination(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.termination = Some(Box::new(condition));
        self
    }

    /// Stop after this many turns even if the condition never fires
    pub fn max_turns(mut self, max: usize) -> Self {
        self.max_turns = Some(max);
        self
    }

    /// Set the event buffer size for streaming runs
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Build the Team, rejecting configurations that can never run
    pub fn build(self) -> Result<Team> {
        validate_roster(self.agents.iter().map(Agent::name))?;

        if self.max_turns == Some(0) {
            return Err(AgoraError::config("max_turns must be at least 1"));
        }

        let termination: Box<dyn TerminationCondition> = match self.termination {
            Some(condition) => {
                condition.validate()?;
                condition
            }
            None if self.max_turns.is_some() => Box::new(AnyOf::new()),
            None => {
                return Err(AgoraError::config(
                    "a team needs a termination condition or a turn limit",
                ))
            }
        };

        let scheduler: Box<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Box::new(RoundRobinScheduler::new()),
        };

        Ok(Team {
            agents: self.agents,
            scheduler,
            termination,
            max_turns: self.max_turns,
            channel_capacity: self.channel_capacity,
            state: RunState::Idle,
        })
    }
}

impl Default for TeamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A streaming run in progress
///
/// Yields [`TeamEvent`]s as they happen; [`TeamRun::finish`] waits for the
/// final result. Dropping a `TeamRun` cancels the run.
pub struct TeamRun {
    events: ReceiverStream<TeamEvent>,
    handle: JoinHandle<Result<TaskResult>>,
    guard: DropGuard,
}

impl TeamRun {
    /// Wait for the run to end and return its result
    pub async fn finish(self) -> Result<TaskResult> {
        // The guard stays armed until the loop has returned
        let TeamRun {
            handle,
            guard: _guard,
            ..
        } = self;
        handle
            .await
            .map_err(|e| AgoraError::Other(format!("Team task panicked: {}", e)))?
    }
}

impl Stream for TeamRun {
    type Item = TeamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().events).poll_next(cx)
    }
}

/// How one pass of the loop ended early
enum Interrupt {
    Cancelled,
    Failed(AgoraError),
}

impl Team {
    /// Create a builder
    pub fn builder() -> TeamBuilder {
        TeamBuilder::new()
    }

    /// Assemble the configured team on top of a provider
    pub fn from_config(config: &Config, provider: Arc<dyn LLMProvider>) -> Result<Self> {
        config.validate()?;

        let agents = config
            .team
            .agents
            .iter()
            .map(|spec| Agent::from_spec(spec, provider.clone(), &config.provider))
            .collect::<Result<Vec<_>>>()?;

        let termination = TextMention::new(&config.team.termination_token)
            | MaxMessages::new(config.team.max_messages);

        let mut builder = TeamBuilder::new()
            .agents(agents)
            .scheduler(build_scheduler(config, provider))
            .termination(termination);

        if let Some(max) = config.team.max_turns {
            builder = builder.max_turns(max);
        }

        builder.build()
    }

    /// Get the roster
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Get the scheduler name
    pub fn scheduler_name(&self) -> &str {
        self.scheduler.name()
    }

    /// Run the team on a task to completion
    ///
    /// Returns an error only if the team cannot start; a run that fails or
    /// is cancelled still yields a [`TaskResult`] with the partial
    /// transcript.
    pub async fn run(&mut self, task: &str, cancel: &CancellationToken) -> Result<TaskResult> {
        self.drive(task, None, cancel).await
    }

    /// Run the team on a background task, streaming events as they happen
    ///
    /// The run stops when `cancel` fires or when the returned [`TeamRun`] is
    /// dropped, whichever comes first.
    pub fn run_stream(mut self, task: impl Into<String>, cancel: CancellationToken) -> TeamRun {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let task = task.into();
        let run_cancel = cancel.child_token();
        let guard = run_cancel.clone().drop_guard();

        let handle = tokio::spawn(async move { self.drive(&task, Some(&tx), &run_cancel).await });

        TeamRun {
            events: ReceiverStream::new(rx),
            handle,
            guard,
        }
    }

    async fn drive(
        &mut self,
        task: &str,
        events: Option<&mpsc::Sender<TeamEvent>>,
        cancel: &CancellationToken,
    ) -> Result<TaskResult> {
        if self.state != RunState::Idle {
            return Err(AgoraError::config(format!(
                "team has already run (state: {})",
                self.state
            )));
        }

        self.state = RunState::Running;
        let mut transcript = Transcript::new(task);

        info!(
            agents = self.agents.len(),
            scheduler = self.scheduler.name(),
            "team run started"
        );

        if let Some(seed) = transcript.last().cloned() {
            emit(events, TeamEvent::Message(seed)).await;
        }

        let mut state = LoopState::new(self.max_turns);

        let result = loop {
            if cancel.is_cancelled() {
                break TaskResult::cancelled(transcript);
            }

            if state.turn_limit_reached() {
                let reason = format!("Maximum number of turns {} reached", state.turn);
                break TaskResult::terminal(transcript, reason);
            }

            match self.take_turn(&mut transcript, cancel).await {
                Ok(message) => {
                    state.next_turn();
                    emit(events, TeamEvent::Message(message)).await;
                }
                Err(Interrupt::Cancelled) => break TaskResult::cancelled(transcript),
                Err(Interrupt::Failed(e)) => {
                    warn!(error = %e, turn = state.turn + 1, "team run failed");
                    break TaskResult::failed(transcript, e);
                }
            }

            if let Some(reason) = self.termination.check(&transcript) {
                break TaskResult::terminal(transcript, reason);
            }
        };

        self.state = result.state;

        info!(
            state = %result.state,
            turns = result.transcript.turns(),
            reason = result.stop_reason.as_deref().unwrap_or(""),
            "team run finished"
        );

        emit(
            events,
            TeamEvent::Finished {
                state: result.state,
                stop_reason: result.stop_reason.clone(),
            },
        )
        .await;

        Ok(result)
    }

    /// One scheduler decision plus one agent invocation
    ///
    /// Nothing is appended unless the agent's reply arrives before
    /// cancellation.
    async fn take_turn(
        &mut self,
        transcript: &mut Transcript,
        cancel: &CancellationToken,
    ) -> std::result::Result<Message, Interrupt> {
        let index = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Interrupt::Cancelled),
            selected = self.scheduler.next(&self.agents, transcript) => {
                selected.map_err(Interrupt::Failed)?
            }
        };

        let agent = self.agents.get(index).ok_or_else(|| {
            Interrupt::Failed(AgoraError::selection(format!(
                "scheduler returned index {} for a roster of {}",
                index,
                self.agents.len()
            )))
        })?;

        debug!(agent = %agent.name(), turn = transcript.turns() + 1, "speaker selected");

        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Interrupt::Cancelled),
            reply = agent.respond(transcript) => reply.map_err(Interrupt::Failed)?,
        };

        let message = transcript.push(agent.name(), content).clone();

        info!(
            agent = %message.source,
            sequence = message.sequence,
            chars = message.content.len(),
            "message appended"
        );

        Ok(message)
    }
}

async fn emit(events: Option<&mpsc::Sender<TeamEvent>>, event: TeamEvent) {
    if let Some(tx) = events {
        if tx.send(event).await.is_err() {
            debug!("event receiver dropped");
        }
    }
}
