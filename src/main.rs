//! Agora - turn-taking conversations between language-model agents
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use agora::core::SchedulerKind;
use agora::{Config, Console, Repl};

/// Agora - turn-taking conversations between language-model agents
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/agora/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Hand-off policy between agents
    #[arg(long, short = 's', value_enum)]
    scheduler: Option<SchedulerKind>,

    /// Model used by every agent
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Stop after this many agent messages
    #[arg(long)]
    max_messages: Option<usize>,

    /// Print the final transcript as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Single task mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default_config_toml());
        return Ok(());
    }

    // Build configuration
    let mut config = match args.config {
        Some(ref path) => {
            let _ = dotenvy::dotenv();
            Config::load_from(path)?
        }
        None => Config::load(),
    };

    // Apply CLI overrides
    if let Some(scheduler) = args.scheduler {
        config.team.scheduler = scheduler;
    }

    if let Some(ref model) = args.model {
        config.provider.model = model.clone();
    }

    if let Some(max) = args.max_messages {
        config.team.max_messages = max;
    }

    if args.debug {
        config.debug = true;
    }

    init_tracing(config.debug);
    config.validate()?;

    // Single task mode
    if let Some(prompt) = args.prompt {
        let console = Console::new(config.streaming.enabled && !args.json, args.json);
        let provider = agora::llm::create_provider(&config)?;
        let repl = Repl::new(config, provider, console);

        let result = repl.run_task(&prompt).await?;
        if result.is_failed() {
            let reason = result.stop_reason.unwrap_or_default();
            anyhow::bail!("run failed: {}", reason);
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "agora=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}
