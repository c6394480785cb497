//! Agent module - participants and the conversation loop
//!
//! Contains the agents themselves, the shared transcript, and the team that
//! lets them take turns.

pub mod assistant;
pub mod run_state;
pub mod team;
pub mod transcript;

pub use assistant::{Agent, AgentBuilder};
pub use run_state::{LoopState, RunState, TaskResult};
pub use team::{Team, TeamBuilder, TeamEvent, TeamRun};
pub use transcript::Transcript;
