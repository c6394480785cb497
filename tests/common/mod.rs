//! Shared fakes for team integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agora::agent::Agent;
use agora::core::{AgoraError, ChatMessage, Result};
use agora::llm::{GenerateOptions, LLMProvider, LLMResponse};
use agora::scheduler::{DecisionService, SelectionRequest};
use async_trait::async_trait;
use tokio::sync::Notify;

/// Replies from a fixed queue, repeating the last one when it runs dry
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    calls: AtomicUsize,
    contexts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies: VecDeque<String> = replies.into_iter().map(Into::into).collect();
        let fallback = replies.back().cloned().unwrap_or_else(|| "ok".to_string());
        Arc::new(Self {
            replies: Mutex::new(replies),
            fallback,
            calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages sent on each call, system prompt first
    pub fn contexts(&self) -> Vec<Vec<ChatMessage>> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(messages.to_vec());

        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        Ok(LLMResponse {
            content,
            usage: None,
            model: model.to_string(),
        })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["scripted".to_string()])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Never answers; signals `started` once a call is in flight and
/// `abandoned` once that call's future is dropped
pub struct PendingProvider {
    pub started: Notify,
    pub abandoned: Notify,
    calls: AtomicUsize,
}

impl PendingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            abandoned: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Notifies when dropped
struct NotifyOnDrop<'a>(&'a Notify);

impl Drop for NotifyOnDrop<'_> {
    fn drop(&mut self) {
        self.0.notify_one();
    }
}

#[async_trait]
impl LLMProvider for PendingProvider {
    async fn chat(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _abandoned = NotifyOnDrop(&self.abandoned);
        self.started.notify_one();
        std::future::pending::<()>().await;
        unreachable!()
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "pending"
    }
}

/// Always fails with the given provider error
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            message: message.into(),
        })
    }
}

#[async_trait]
impl LLMProvider for FailingProvider {
    async fn chat(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        Err(AgoraError::provider(self.message.clone()))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Err(AgoraError::provider(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Decision service answering from a queue and recording what it was offered
pub struct ScriptedDecisions {
    answers: Mutex<VecDeque<String>>,
    offered: Mutex<Vec<Vec<String>>>,
}

impl ScriptedDecisions {
    pub fn new<I, S>(answers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            offered: Mutex::new(Vec::new()),
        })
    }

    /// Candidate lists from each request, in order
    pub fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionService for ScriptedDecisions {
    async fn decide(&self, request: &SelectionRequest) -> Result<String> {
        self.offered.lock().unwrap().push(request.candidates.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgoraError::selection("no scripted answer left"))
    }
}

/// Answers from a queue, then hangs on the next request after signalling
/// `started`
pub struct PendingDecisions {
    answers: Mutex<VecDeque<String>>,
    pub started: Notify,
}

impl PendingDecisions {
    pub fn new<I, S>(answers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            started: Notify::new(),
        })
    }
}

#[async_trait]
impl DecisionService for PendingDecisions {
    async fn decide(&self, _request: &SelectionRequest) -> Result<String> {
        let next = self.answers.lock().unwrap().pop_front();
        if let Some(answer) = next {
            return Ok(answer);
        }
        self.started.notify_one();
        std::future::pending::<()>().await;
        unreachable!()
    }
}

pub fn agent(name: &str, provider: Arc<dyn LLMProvider>) -> Agent {
    Agent::builder(name)
        .instructions(format!("You are {}.", name))
        .model("test-model")
        .provider(provider)
        .build()
        .unwrap()
}

/// Agent whose replies are `"{name} {n}"` for n = 1, 2, ...
pub fn counting_agent(name: &str, turns: usize) -> Agent {
    let replies: Vec<String> = (1..=turns).map(|n| format!("{} {}", name, n)).collect();
    agent(name, ScriptedProvider::new(replies))
}

/// Message sources in transcript order
pub fn sources(messages: &[agora::Message]) -> Vec<&str> {
    messages.iter().map(|m| m.source.as_str()).collect()
}
