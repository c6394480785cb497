//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use clap::ValueEnum;

use crate::core::{Config, Result, SchedulerKind};
use crate::llm::LLMProvider;

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command: run it as a task
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
}

/// Parse and handle special commands
pub async fn handle_command(
    input: &str,
    config: &mut Config,
    provider: &dyn LLMProvider,
) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "roster" | "agents" => Ok(CommandResult::Handled(roster_text(config))),

        "status" => Ok(CommandResult::Handled(status_text(config, provider.name()))),

        "models" => {
            let models = provider.list_models().await?;
            let output = format!(
                "Available models:\n{}\n\nCurrent: {}",
                models
                    .iter()
                    .map(|m| format!("  - {}", m))
                    .collect::<Vec<_>>()
                    .join("\n"),
                config.provider.model
            );
            Ok(CommandResult::Handled(output))
        }

        "set" => Ok(handle_set_command(args, config)),

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Handle 'set' subcommands
fn handle_set_command(args: &str, config: &mut Config) -> CommandResult {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();

    if parts.is_empty() || parts[0].is_empty() {
        return CommandResult::Handled(
            "Usage: set <scheduler|model|max_messages|token> <value>\n\
             Examples:\n\
               set scheduler selector\n\
               set model gpt-4o-mini\n\
               set max_messages 12\n\
               set token DONE"
                .to_string(),
        );
    }

    let key = parts[0].to_lowercase();
    let value = parts.get(1).map(|s| s.trim()).unwrap_or("");

    if value.is_empty() {
        return CommandResult::Handled(format!("Usage: set {} <value>", key));
    }

    match key.as_str() {
        "scheduler" => match SchedulerKind::from_str(&value.replace('_', "-"), true) {
            Ok(kind) => {
                config.team.scheduler = kind;
                CommandResult::Handled(format!("Scheduler set to: {}", kind))
            }
            Err(_) => CommandResult::Handled(format!(
                "Unknown scheduler: {}. Available: round_robin, selector",
                value
            )),
        },

        "model" => {
            config.provider.model = value.to_string();
            CommandResult::Handled(format!("Model set to: {}", value))
        }

        "max_messages" | "max" => match value.parse::<usize>() {
            Ok(n) if n > 0 => {
                config.team.max_messages = n;
                CommandResult::Handled(format!("Max messages set to: {}", n))
            }
            _ => CommandResult::Handled("max_messages must be a positive number".to_string()),
        },

        "token" => {
            config.team.termination_token = value.to_string();
            CommandResult::Handled(format!("Termination token set to: {}", value))
        }

        _ => CommandResult::Handled(format!(
            "Unknown setting: {}. Available: scheduler, model, max_messages, token",
            key
        )),
    }
}

fn roster_text(config: &Config) -> String {
    let mut output = String::from("Roster:\n");
    for (i, agent) in config.team.agents.iter().enumerate() {
        output.push_str(&format!("  {}. {}", i + 1, agent.name));
        if let Some(ref description) = agent.description {
            output.push_str(&format!(" - {}", description));
        }
        output.push('\n');
    }
    output
}

fn status_text(config: &Config, provider: &str) -> String {
    format!(
        "Agora Status:\n\
         ─────────────────────────────\n\
         Provider:     {} ({})\n\
         Model:        {}\n\
         Scheduler:    {}\n\
         Agents:       {}\n\
         Stop token:   {}\n\
         Max messages: {}\n\
         Max turns:    {}",
        provider,
        config.provider.base_url,
        config.provider.model,
        config.team.scheduler,
        config.team.agents.len(),
        config.team.termination_token,
        config.team.max_messages,
        config
            .team
            .max_turns
            .map(|n| n.to_string())
            .unwrap_or_else(|| "none".to_string())
    )
}

/// Generate help text
fn help_text() -> String {
    r#"Agora Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Agora
  roster           List the agents in turn order
  status           Show current configuration
  models           List models offered by the provider

  set scheduler <round_robin|selector>   Choose the hand-off policy
  set model <model>                      Set the model for every agent
  set max_messages <n>                   Stop after n agent messages
  set token <text>                       Set the termination token

Anything else is given to the team as a task.

Keyboard Shortcuts:
  Ctrl+C           Cancel the running conversation
  Ctrl+D           Exit Agora
─────────────────────────────────────────────"#
        .to_string()
}
