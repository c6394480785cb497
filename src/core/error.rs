//! Custom error types for Agora
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Agora operations
#[derive(Error, Debug)]
pub enum AgoraError {
    /// Invalid team setup: empty roster, zero limits, duplicate names
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The selector could not resolve the next speaker
    #[error("Selection error: {0}")]
    Selection(String),

    /// An agent's model invocation failed
    #[error("Agent '{agent}' failed: {source}")]
    Invocation {
        agent: String,
        #[source]
        source: Box<AgoraError>,
    },

    /// The run was cancelled between turns
    #[error("Run cancelled")]
    Cancelled,

    /// Model provider connection or API errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Model not available
    #[error("Model '{0}' not available from the configured provider")]
    ModelNotFound(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Agora operations
pub type Result<T> = std::result::Result<T, AgoraError>;

impl AgoraError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a selection error
    pub fn selection(msg: impl Into<String>) -> Self {
        Self::Selection(msg.into())
    }

    /// Create an invocation error for the named agent
    pub fn invocation(agent: impl Into<String>, source: AgoraError) -> Self {
        Self::Invocation {
            agent: agent.into(),
            source: Box::new(source),
        }
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// Only transport-level failures qualify; the team loop never retries on
    /// its own, this is for callers deciding their own policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status()
                        .map(|s| s.is_server_error() || s.as_u16() == 429)
                        .unwrap_or(false)
            }
            Self::Provider(msg) => msg.starts_with("Cannot connect"),
            Self::Invocation { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
