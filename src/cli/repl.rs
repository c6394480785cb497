//! Interactive REPL for Agora
//!
//! Each line typed at the prompt is handed to a fresh team as its task.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::agent::{TaskResult, Team};
use crate::cli::commands::{handle_command, CommandResult};
use crate::cli::console::Console;
use crate::core::{Config, Result};
use crate::llm::{create_provider, LLMProvider};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    config: Config,
    provider: Arc<dyn LLMProvider>,
    console: Console,
}

impl Repl {
    /// Create a REPL on top of an existing provider
    pub fn new(config: Config, provider: Arc<dyn LLMProvider>, console: Console) -> Self {
        Self {
            config,
            provider,
            console,
        }
    }

    /// Create a REPL with the provider described by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = create_provider(&config)?;
        let console = Console::new(config.streaming.enabled, false);
        Ok(Self::new(config, provider, console))
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one task through a new team, cancelling it on Ctrl+C
    pub async fn run_task(&self, task: &str) -> Result<TaskResult> {
        let team = Team::from_config(&self.config, self.provider.clone())?;
        let cancel = CancellationToken::new();

        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    debug!("interrupt received, cancelling run");
                    cancel.cancel();
                }
            })
        };

        let result = self.console.render(team.run_stream(task, cancel)).await;
        watcher.abort();
        result
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("Task: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.config, self.provider.as_ref()).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::Continue(task)) => {
                    println!();
                    match self.run_task(&task).await {
                        Ok(result) if result.is_failed() => {
                            if let Some(ref e) = result.error {
                                eprintln!("Run failed: {}\n", e);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => eprintln!("\nError: {}\n", e),
                    }
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let names: Vec<&str> = self
            .config
            .team
            .agents
            .iter()
            .map(|a| a.name.as_str())
            .collect();

        println!(
            r#"
╔═══════════════════════════════════════════════════════════╗
║                          AGORA                            ║
║        Turn-taking conversations between agents           ║
╚═══════════════════════════════════════════════════════════╝

  Provider:  {} ({})
  Scheduler: {}
  Agents:    {}

  Type a task to start a conversation, 'help' for commands.
"#,
            self.provider.name(),
            self.config.provider.model,
            self.config.team.scheduler,
            names.join(" → ")
        );
    }
}
