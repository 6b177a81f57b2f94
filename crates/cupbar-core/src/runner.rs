use crate::error::CommandFailure;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

pub type CommandResult = Result<CommandOutput, CommandFailure>;

/// Runs one external process per call.
///
/// Dropping the returned future abandons the call; implementations must not
/// leave the child running when that happens.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> CommandResult;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> CommandResult {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| CommandFailure::Spawn {
                program: program.to_string(),
                message: err.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(CommandFailure::Exit {
                code: output.status.code(),
                stderr,
            });
        }
        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn captures_stdout_of_successful_command() {
        let output = ProcessCommandRunner
            .run("sh", &args(&["-c", "printf 'Acme | x\\n'"]))
            .await
            .expect("command succeeds");
        assert_eq!(output.stdout, "Acme | x\n");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_failure_with_stderr() {
        let failure = ProcessCommandRunner
            .run("sh", &args(&["-c", "echo 'no such project' >&2; exit 3"]))
            .await
            .expect_err("command fails");
        assert_eq!(
            failure,
            CommandFailure::Exit {
                code: Some(3),
                stderr: "no such project".to_string(),
            }
        );
        assert_eq!(failure.detail(), "no such project");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_failure() {
        let failure = ProcessCommandRunner
            .run("cupbar-definitely-missing-binary", &[])
            .await
            .expect_err("spawn fails");
        assert!(matches!(failure, CommandFailure::Spawn { .. }));
    }

    #[tokio::test]
    async fn arguments_are_not_shell_split() {
        let output = ProcessCommandRunner
            .run("printf", &args(&["%s|", "draft \"outline\" here"]))
            .await
            .expect("command succeeds");
        assert_eq!(output.stdout, "draft \"outline\" here|");
    }
}
