//! Agora - turn-taking conversations between language-model agents
//!
//! A small number of prompt-configured agents share one transcript and take
//! turns on a task until a termination condition fires.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model provider abstraction with Ollama and OpenAI backends
//! - **Agent**: Agents, the transcript, and the team loop
//! - **Scheduler**: Round-robin and model-selected hand-off policies
//! - **Termination**: Text-mention and message-count stop conditions
//! - **CLI**: Console rendering and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use agora::agent::Team;
//! use agora::llm::create_provider;
//! use agora::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> agora::Result<()> {
//!     let config = Config::load();
//!     let provider = create_provider(&config)?;
//!     let mut team = Team::from_config(&config, provider)?;
//!
//!     let result = team.run("Plan a habit tracking app", &CancellationToken::new()).await?;
//!     for message in result.messages() {
//!         println!("{}: {}", message.source, message.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod scheduler;
pub mod termination;

// Re-export commonly used items
pub use agent::{Agent, Team, TeamEvent, Transcript};
pub use cli::{Console, Repl};
pub use core::{AgoraError, Config, Message, Result};
