//! Core module - shared infrastructure for Agora
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentSpec, Config, ProviderConfig, ProviderKind, SchedulerKind, TeamConfig};
pub use error::{AgoraError, Result};
pub use types::*;
