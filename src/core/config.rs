//! Configuration management for Agora
//!
//! Supports environment variables, config files, and runtime overrides.
//! The roster, termination settings and provider credentials all live here
//! and are passed explicitly into team construction.
//!
//! Config file location: ~/.config/agora/config.toml

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{AgoraError, Result};
use crate::core::types::USER_SOURCE;

/// Main configuration for Agora
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model provider configuration
    pub provider: ProviderConfig,
    /// Team configuration
    pub team: TeamConfig,
    /// Streaming configuration
    #[serde(default)]
    pub streaming: StreamingConfig,
    /// Whether to show debug output
    #[serde(default)]
    pub debug: bool,
}

/// Which model backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible chat completions API
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind
    pub kind: ProviderKind,
    /// Base URL of the API (without trailing slash)
    pub base_url: String,
    /// API key, if the backend needs one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used by every agent unless overridden
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature for agent turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Cap on tokens generated per agent turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Hand-off policy between agents
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Fixed cyclic order over the roster
    #[default]
    RoundRobin,
    /// A model picks the next speaker each turn
    Selector,
}

impl std::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerKind::RoundRobin => write!(f, "round_robin"),
            SchedulerKind::Selector => write!(f, "selector"),
        }
    }
}

/// One roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique agent name, used as the message source
    pub name: String,
    /// Instruction text given to the model as the system prompt
    pub instructions: String,
    /// Short description shown to the selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            description: None,
        }
    }
}

/// Team behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Hand-off policy
    #[serde(default)]
    pub scheduler: SchedulerKind,
    /// Literal marker that ends the conversation when any message contains it
    /// Default: TERMINATE
    pub termination_token: String,
    /// Maximum number of agent messages before stopping
    /// Default: 50
    pub max_messages: usize,
    /// Optional hard cap on turns, independent of the termination condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<usize>,
    /// Model used by the selector (defaults to the provider model)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_model: Option<String>,
    /// Ordered roster
    pub agents: Vec<AgentSpec>,
}

/// Console streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Print each message as soon as it is appended (vs after the run)
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            team: TeamConfig::default(),
            streaming: StreamingConfig::default(),
            debug: env::var("AGORA_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let kind = match env::var("AGORA_PROVIDER").as_deref() {
            Ok("ollama") => ProviderKind::Ollama,
            _ => ProviderKind::OpenAi,
        };

        let default_url = match kind {
            ProviderKind::Ollama => "http://localhost:11434",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
        };

        let default_model = match kind {
            ProviderKind::Ollama => "qwen3:8b",
            ProviderKind::OpenAi => "gpt-4o",
        };

        Self {
            kind,
            base_url: env::var("AGORA_BASE_URL").unwrap_or_else(|_| default_url.to_string()),
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env::var("AGORA_MODEL").unwrap_or_else(|_| default_model.to_string()),
            timeout_secs: 120,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerKind::RoundRobin,
            termination_token: "TERMINATE".to_string(),
            max_messages: 50,
            max_turns: None,
            selector_model: None,
            agents: default_roster(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("AGORA_STREAMING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

/// The product-planning team: research hands off to planning, planning
/// iterates with mock development, which closes the run.
pub fn default_roster() -> Vec<AgentSpec> {
    vec![
        AgentSpec {
            name: "MarketResearchAgent".to_string(),
            instructions: "You are a market research expert. Analyze the results of the \
                           user interview, then hand your findings to ProductPlanningAgent \
                           as input for a product plan."
                .to_string(),
            description: Some("Analyzes the market from the user's interview".to_string()),
        },
        AgentSpec {
            name: "ProductPlanningAgent".to_string(),
            instructions: "Draft a product plan from the market research. Hand a concrete \
                           mock development proposal to MockDevelopmentAgent and give it \
                           feedback on the mock. User feedback is not needed, it happens \
                           after the mock is built."
                .to_string(),
            description: Some("Turns research into a product plan".to_string()),
        },
        AgentSpec {
            name: "MockDevelopmentAgent".to_string(),
            instructions: "Design an outline of the mock based on the plan, using recent \
                           library versions. Ask ProductPlanningAgent for feedback on the \
                           outline. Once it is approved, implement a streamlit app that runs \
                           from a Dockerfile and include the source code and the Dockerfile. \
                           When the implementation is complete, end your reply with only \
                           'TERMINATE'."
                .to_string(),
            description: Some("Builds the mock application".to_string()),
        },
    ]
}

/// Check roster names for the construction-time configuration errors
pub fn validate_roster<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(AgoraError::config("agent names must not be empty"));
        }
        if name == USER_SOURCE {
            return Err(AgoraError::config(format!(
                "agent name '{}' is reserved for the task message",
                USER_SOURCE
            )));
        }
        if !seen.insert(name) {
            return Err(AgoraError::config(format!("duplicate agent name '{}'", name)));
        }
    }

    if seen.is_empty() {
        return Err(AgoraError::config("team roster is empty"));
    }

    Ok(())
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agora")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from(&Self::config_file()) {
            return config;
        }

        Self::default()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgoraError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AgoraError::config(format!("Failed to read config: {}", e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| AgoraError::config(format!("Failed to parse config: {}", e)))?;

        // Credentials usually stay out of the file
        if config.provider.api_key.is_none() {
            config.provider.api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    AgoraError::config(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        // Never write the key back to disk
        let mut on_disk = self.clone();
        on_disk.provider.api_key = None;

        let content = toml::to_string_pretty(&on_disk)
            .map_err(|e| AgoraError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| AgoraError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check the team section for configuration errors
    pub fn validate(&self) -> Result<()> {
        validate_roster(self.team.agents.iter().map(|a| a.name.as_str()))?;

        if self.team.max_messages == 0 {
            return Err(AgoraError::config("max_messages must be at least 1"));
        }

        if self.team.termination_token.is_empty() {
            return Err(AgoraError::config("termination_token must not be empty"));
        }

        if self.team.max_turns == Some(0) {
            return Err(AgoraError::config("max_turns must be at least 1"));
        }

        Ok(())
    }

    /// Model the selector should use
    pub fn selector_model(&self) -> &str {
        self.team
            .selector_model
            .as_deref()
            .unwrap_or(&self.provider.model)
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let mut config = Config::default();
        config.provider.api_key = None;
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_team() {
        let team = TeamConfig::default();
        assert_eq!(team.termination_token, "TERMINATE");
        assert_eq!(team.max_messages, 50);
        assert_eq!(team.scheduler, SchedulerKind::RoundRobin);
        assert_eq!(team.agents.len(), 3);
        assert_eq!(team.agents[0].name, "MarketResearchAgent");
    }

    #[test]
    fn test_default_roster_ends_with_token() {
        let roster = default_roster();
        assert!(roster[2].instructions.contains("TERMINATE"));
    }

    #[test]
    fn test_validate_roster() {
        assert!(validate_roster(["A", "B"]).is_ok());
        assert!(matches!(
            validate_roster(Vec::<&str>::new()),
            Err(AgoraError::Configuration(_))
        ));
        assert!(validate_roster(["A", "A"]).is_err());
        assert!(validate_roster(["user"]).is_err());
        assert!(validate_roster(["  "]).is_err());
    }

    #[test]
    fn test_validate_limits() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.team.max_messages = 0;
        assert!(config.validate().is_err());

        config.team.max_messages = 5;
        config.team.max_turns = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = Config::default_config_toml();
        assert!(toml_str.contains("termination_token"));
        assert!(toml_str.contains("MarketResearchAgent"));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_scheduler_kind_serde() {
        let toml_str = r#"
            scheduler = "selector"
            termination_token = "DONE"
            max_messages = 4

            [[agents]]
            name = "A"
            instructions = "be A"
        "#;
        let team: TeamConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(team.scheduler, SchedulerKind::Selector);
        assert_eq!(team.agents[0].description, None);
    }

    #[test]
    fn test_selector_model_falls_back_to_provider_model() {
        let mut config = Config::default();
        config.provider.model = "base".to_string();
        assert_eq!(config.selector_model(), "base");

        config.team.selector_model = Some("picker".to_string());
        assert_eq!(config.selector_model(), "picker");
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("agora"));
    }
}
