//! Console rendering
//!
//! Prints a team run to stdout, one titled block per message.

use std::io::{self, Write};

use futures::StreamExt;

use crate::agent::{RunState, TaskResult, TeamEvent, TeamRun};
use crate::core::{Message, Result};

/// Renders streamed team output
#[derive(Debug, Clone, Copy)]
pub struct Console {
    /// Print messages as they arrive instead of after the run
    streaming: bool,
    /// Print the final transcript as JSON instead of text blocks
    json: bool,
}

impl Console {
    pub fn new(streaming: bool, json: bool) -> Self {
        Self { streaming, json }
    }

    /// Format one message as a titled block
    pub fn format_message(message: &Message) -> String {
        format!(
            "---------- {} ----------\n{}\n",
            message.source,
            message.content.trim_end()
        )
    }

    /// Format the closing status line
    pub fn format_finish(state: RunState, stop_reason: Option<&str>) -> String {
        match stop_reason {
            Some(reason) => format!("[{}] {}", state, reason),
            None => format!("[{}]", state),
        }
    }

    /// Drain a run to stdout and return its result
    pub async fn render(&self, mut run: TeamRun) -> Result<TaskResult> {
        let live = self.streaming && !self.json;
        let mut stdout = io::stdout();

        while let Some(event) = run.next().await {
            match event {
                TeamEvent::Message(message) if live => {
                    println!("{}", Self::format_message(&message));
                    stdout.flush()?;
                }
                TeamEvent::Finished { state, stop_reason } if live => {
                    println!("{}\n", Self::format_finish(state, stop_reason.as_deref()));
                }
                _ => {}
            }
        }

        let result = run.finish().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result.transcript)?);
        } else if !live {
            for message in result.messages() {
                println!("{}", Self::format_message(message));
            }
            println!(
                "{}\n",
                Self::format_finish(result.state, result.stop_reason.as_deref())
            );
        }

        Ok(result)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(true, false)
    }
}
