use crate::runner::{CommandResult, CommandRunner};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_PROGRAM: &str = "coffeecup-cli";

/// Typed front for the time tracker's subcommands.
///
/// Every invocation and its raw output is written to the diagnostic log here,
/// so callers only log what they decide on top of it.
#[derive(Clone)]
pub struct TrackerCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl TrackerCli {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub async fn version(&self) -> CommandResult {
        self.run(&["version"]).await
    }

    pub async fn today(&self) -> CommandResult {
        self.run(&["today"]).await
    }

    pub async fn project_aliases(&self) -> CommandResult {
        self.run(&["projects", "alias"]).await
    }

    pub async fn start(&self, alias: &str, comment: Option<&str>) -> CommandResult {
        match comment {
            Some(comment) => self.run(&["start", alias, comment]).await,
            None => self.run(&["start", alias]).await,
        }
    }

    pub async fn stop(&self) -> CommandResult {
        self.run(&["stop"]).await
    }

    async fn run(&self, args: &[&str]) -> CommandResult {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let command = args.join(" ");
        let result = self.runner.run(&self.program, &args).await;
        match &result {
            Ok(output) => {
                info!(
                    event = "command_ok",
                    program = %self.program,
                    command = %command,
                    stdout = %output.stdout,
                    stderr = %output.stderr,
                );
            }
            Err(failure) => {
                warn!(
                    event = "command_failed",
                    program = %self.program,
                    command = %command,
                    error = %failure,
                );
            }
        }
        result
    }
}
