//! Assistant agents
//!
//! A named participant with fixed instructions that answers one turn at a
//! time through a model provider.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::agent::transcript::Transcript;
use crate::core::{AgentSpec, AgoraError, ProviderConfig, Result};
use crate::llm::{GenerateOptions, LLMProvider};

/// A prompt-configured participant in a team
///
/// Agents are immutable once built; cloning shares the provider handle.
#[derive(Clone)]
pub struct Agent {
    /// Name of this agent, used as the message source
    name: String,
    /// System prompt defining the agent's role
    instructions: String,
    /// Short description for the selector
    description: Option<String>,
    /// Model to use
    model: String,
    /// Model invocation endpoint
    provider: Arc<dyn LLMProvider>,
    /// Generation options for each turn
    options: GenerateOptions,
}

/// Builder for creating Agents
pub struct AgentBuilder {
    name: String,
    instructions: Option<String>,
    description: Option<String>,
    model: Option<String>,
    provider: Option<Arc<dyn LLMProvider>>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl AgentBuilder {
    /// Create a new builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            description: None,
            model: None,
            provider: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the instructions (system prompt)
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the description shown to a selector
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the model to use
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the model provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the length of each reply
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the Agent
    pub fn build(self) -> Result<Agent> {
        let provider = self.provider.ok_or_else(|| {
            AgoraError::config(format!("agent '{}' has no model provider", self.name))
        })?;

        let model = self
            .model
            .ok_or_else(|| AgoraError::config(format!("agent '{}' has no model", self.name)))?;

        Ok(Agent {
            instructions: self.instructions.unwrap_or_else(|| {
                format!(
                    "You are a helpful assistant named '{}'. Work with the other participants to complete the task.",
                    self.name
                )
            }),
            name: self.name,
            description: self.description,
            model,
            provider,
            options: GenerateOptions {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stop: None,
            },
        })
    }
}

impl Agent {
    /// Create a builder
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    /// Build an agent from a roster entry and the provider settings
    pub fn from_spec(
        spec: &AgentSpec,
        provider: Arc<dyn LLMProvider>,
        settings: &ProviderConfig,
    ) -> Result<Self> {
        let mut builder = AgentBuilder::new(&spec.name)
            .instructions(&spec.instructions)
            .model(&settings.model)
            .provider(provider);

        if let Some(ref description) = spec.description {
            builder = builder.description(description);
        }
        if let Some(t) = settings.temperature {
            builder = builder.temperature(t);
        }
        if let Some(n) = settings.max_tokens {
            builder = builder.max_tokens(n);
        }

        builder.build()
    }

    /// Get the name of this agent
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the instruction text
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Description for the selector, falling back to the instructions
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.instructions)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Produce this agent's next message given the transcript so far
    pub async fn respond(&self, transcript: &Transcript) -> Result<String> {
        let context = transcript.to_chat_messages(&self.name);

        debug!(
            agent = %self.name,
            model = %self.model,
            context_len = context.len(),
            "invoking model"
        );

        self.provider
            .complete(
                &self.model,
                &context,
                &self.instructions,
                Some(self.options.clone()),
            )
            .await
            .map_err(|e| AgoraError::invocation(&self.name, e))
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider.name())
            .finish()
    }
}
