//! LLM provider factory
//!
//! Builds the configured backend behind a shared trait object.

use std::sync::Arc;

use tracing::debug;

use crate::core::{Config, ProviderKind, Result};
use crate::llm::traits::LLMProvider;
use crate::llm::{OllamaClient, OpenAiClient};

/// Create a new LLM provider based on configuration
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match config.provider.kind {
        ProviderKind::Ollama => Arc::new(OllamaClient::from_config(&config.provider)?),
        ProviderKind::OpenAi => Arc::new(OpenAiClient::from_config(&config.provider)?),
    };

    debug!(
        provider = provider.name(),
        base_url = %config.provider.base_url,
        "provider created"
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgoraError;

    #[test]
    fn test_create_ollama_provider() {
        let mut config = Config::default();
        config.provider.kind = ProviderKind::Ollama;
        config.provider.base_url = "http://localhost:11434".to_string();

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_openai_without_key_fails() {
        let mut config = Config::default();
        config.provider.kind = ProviderKind::OpenAi;
        config.provider.api_key = None;

        assert!(matches!(
            create_provider(&config),
            Err(AgoraError::Configuration(_))
        ));
    }
}
