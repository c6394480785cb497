//! CLI module - Command line interface
//!
//! Provides console rendering of team runs and the interactive REPL.

pub mod commands;
pub mod console;
pub mod repl;

pub use console::Console;
pub use repl::Repl;
