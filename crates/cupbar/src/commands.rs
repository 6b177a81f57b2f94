//! One-shot subcommands that print to the console and exit.

use anyhow::{bail, Result};
use async_trait::async_trait;
use cupbar_core::probe::{probe, NOT_INSTALLED_MESSAGE, REMEDIATION_URL};
use cupbar_core::workflow::option_label;
use cupbar_core::{
    CommandFailure, CommentRequest, CupbarConfig, Notification, NotificationLevel, Notifier,
    PickRequest, Prompter, ReportFormat, StatusModel, TaskSwitcher, TextReports, TrackerCli,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub async fn print_status(config: &CupbarConfig, cli: &TrackerCli) -> Result<()> {
    let output = cli.today().await.map_err(not_installed_or)?;
    let status = TextReports.active_status(&output.stdout);
    println!("{}", config.status_line_style().render(&status));
    Ok(())
}

pub async fn print_projects(cli: &TrackerCli) -> Result<()> {
    let output = cli.project_aliases().await.map_err(not_installed_or)?;
    for project in TextReports.project_listing(&output.stdout) {
        println!("{}", option_label(&project));
    }
    Ok(())
}

pub async fn stop(cli: &TrackerCli) -> Result<()> {
    if let Err(err) = probe(cli).await {
        bail!("{NOT_INSTALLED_MESSAGE} See {REMEDIATION_URL} ({err})");
    }
    let format: Arc<dyn ReportFormat> = Arc::new(TextReports);
    let status = Arc::new(StatusModel::new(cli.clone(), format.clone()));
    let notifier = Arc::new(ConsoleNotifier::default());
    let switcher = TaskSwitcher::new(
        cli.clone(),
        format,
        status,
        Arc::new(NoPrompter),
        notifier.clone(),
    );
    switcher.stop().await;
    if notifier.saw_error() {
        bail!("stop failed");
    }
    Ok(())
}

fn not_installed_or(failure: CommandFailure) -> anyhow::Error {
    match failure {
        CommandFailure::Spawn { .. } => {
            anyhow::anyhow!("{NOT_INSTALLED_MESSAGE} See {REMEDIATION_URL}")
        }
        other => anyhow::anyhow!(other.detail()),
    }
}

/// Answers every prompt as dismissed.
struct NoPrompter;

#[async_trait]
impl Prompter for NoPrompter {
    async fn pick(&self, _request: PickRequest) -> Option<String> {
        None
    }

    async fn comment(&self, _request: CommentRequest) -> Option<String> {
        None
    }
}

#[derive(Default)]
struct ConsoleNotifier {
    errored: AtomicBool,
}

impl ConsoleNotifier {
    fn saw_error(&self) -> bool {
        self.errored.load(Ordering::Relaxed)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => println!("{notification}"),
            NotificationLevel::Error => {
                self.errored.store(true, Ordering::Relaxed);
                eprintln!("{notification}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupbar_core::{CommandOutput, CommandResult, CommandRunner};

    struct Scripted {
        version: CommandResult,
        stop: CommandResult,
    }

    #[async_trait]
    impl CommandRunner for Scripted {
        async fn run(&self, _program: &str, args: &[String]) -> CommandResult {
            match args.first().map(String::as_str) {
                Some("version") => self.version.clone(),
                Some("stop") => self.stop.clone(),
                _ => Ok(CommandOutput::stdout("")),
            }
        }
    }

    fn cli(version: CommandResult, stop: CommandResult) -> TrackerCli {
        TrackerCli::new(Arc::new(Scripted { version, stop }), "coffeecup-cli")
    }

    #[tokio::test]
    async fn stop_succeeds_when_tracker_accepts() {
        let cli = cli(Ok(CommandOutput::stdout("1.0")), Ok(CommandOutput::stdout("")));
        assert!(stop(&cli).await.is_ok());
    }

    #[tokio::test]
    async fn stop_fails_on_stderr() {
        let cli = cli(
            Ok(CommandOutput::stdout("1.0")),
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: "no running entry".to_string(),
            }),
        );
        assert!(stop(&cli).await.is_err());
    }

    #[tokio::test]
    async fn stop_reports_missing_tracker() {
        let missing = Err(CommandFailure::Spawn {
            program: "coffeecup-cli".to_string(),
            message: "No such file or directory".to_string(),
        });
        let cli = cli(missing, Ok(CommandOutput::stdout("")));
        let err = stop(&cli).await.unwrap_err();
        assert!(err.to_string().starts_with(NOT_INSTALLED_MESSAGE));
    }

    #[test]
    fn exit_failures_keep_their_detail() {
        let err = not_installed_or(CommandFailure::Exit {
            code: Some(1),
            stderr: "not logged in".to_string(),
        });
        assert_eq!(err.to_string(), "not logged in");
    }
}
