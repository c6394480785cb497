//! LLM Provider trait for abstracting different backends
//!
//! Agents and the selector only ever see this trait, so Ollama, OpenAI or a
//! scripted test double are interchangeable.

use async_trait::async_trait;

use crate::core::{AgoraError, ChatMessage, Result};

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a response from messages
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Check if a model is available
    async fn is_model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m == model))
    }

    /// List available models
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Complete a conversation under the given instructions and return the
    /// text.
    ///
    /// An empty or whitespace-only completion is a content error.
    async fn complete(
        &self,
        model: &str,
        context: &[ChatMessage],
        instructions: &str,
        options: Option<GenerateOptions>,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(context.len() + 1);
        messages.push(ChatMessage::system(instructions));
        messages.extend(context.iter().cloned());

        let response = self.chat(model, &messages, options).await?;

        if response.content.trim().is_empty() {
            return Err(AgoraError::provider(format!(
                "{} returned an empty completion",
                self.name()
            )));
        }

        Ok(response.content)
    }
}
