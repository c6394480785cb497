//! LLM module - Language Model integrations
//!
//! Provides the model invocation endpoint used by agents and the selector,
//! with Ollama and OpenAI-compatible backends.

pub mod ollama;
pub mod openai;
pub mod provider;
pub mod traits;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use provider::create_provider;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
