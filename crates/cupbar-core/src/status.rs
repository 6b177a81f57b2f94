use crate::cli::TrackerCli;
use crate::model::ActiveTaskStatus;
use crate::parse::ReportFormat;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// The one place that knows what is being timed right now.
///
/// [`StatusModel::refresh`] is the only writer. Readers either take a
/// snapshot with [`StatusModel::current`] or [`StatusModel::subscribe`] to be
/// woken when the status actually changes. Concurrent refreshes are not
/// coordinated: whichever finishes last wins.
pub struct StatusModel {
    cli: TrackerCli,
    format: Arc<dyn ReportFormat>,
    state: watch::Sender<ActiveTaskStatus>,
}

impl StatusModel {
    pub fn new(cli: TrackerCli, format: Arc<dyn ReportFormat>) -> Self {
        let (state, _) = watch::channel(ActiveTaskStatus::Idle);
        Self { cli, format, state }
    }

    pub fn current(&self) -> ActiveTaskStatus {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActiveTaskStatus> {
        self.state.subscribe()
    }

    /// Re-reads the `today` report. Returns whether the status changed.
    ///
    /// A failed query keeps the previous status; the failure is already in
    /// the diagnostic log and the next tick retries.
    pub async fn refresh(&self) -> bool {
        let output = match self.cli.today().await {
            Ok(output) => output,
            Err(_) => return false,
        };
        if !output.stderr.is_empty() {
            debug!(event = "status_stderr_ignored", stderr = %output.stderr);
        }
        let next = self.format.active_status(&output.stdout);
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!(event = "status_changed", from = ?current, to = ?next);
            *current = next;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandFailure;
    use crate::parse::TextReports;
    use crate::runner::{CommandOutput, CommandResult, CommandRunner};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedToday {
        replies: Mutex<VecDeque<CommandResult>>,
    }

    impl ScriptedToday {
        fn new(replies: Vec<CommandResult>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedToday {
        async fn run(&self, _program: &str, args: &[String]) -> CommandResult {
            assert_eq!(args, ["today".to_string()]);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected status query")
        }
    }

    fn model(replies: Vec<CommandResult>) -> StatusModel {
        let cli = TrackerCli::new(ScriptedToday::new(replies), "cc");
        StatusModel::new(cli, Arc::new(TextReports))
    }

    fn ok(stdout: &str) -> CommandResult {
        Ok(CommandOutput::stdout(stdout))
    }

    #[tokio::test]
    async fn refresh_replaces_state_with_parsed_status() {
        let model = model(vec![ok("Acme | ⌛ 00:10:00\n"), ok("nothing running\n")]);
        assert_eq!(model.current(), ActiveTaskStatus::Idle);

        assert!(model.refresh().await);
        assert_eq!(model.current().project(), Some("Acme"));

        assert!(model.refresh().await);
        assert_eq!(model.current(), ActiveTaskStatus::Idle);
    }

    #[tokio::test]
    async fn identical_output_is_not_a_change() {
        let model = model(vec![ok("Acme | ⌛ 00:10:00\n"), ok("Acme | ⌛ 00:10:00\n")]);
        let mut rx = model.subscribe();

        assert!(model.refresh().await);
        assert!(rx.has_changed().unwrap());
        let first = rx.borrow_and_update().clone();

        assert!(!model.refresh().await);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(model.current(), first);
    }

    #[tokio::test]
    async fn failed_query_keeps_previous_state() {
        let model = model(vec![
            ok("Acme | ⌛ 00:10:00\n"),
            Err(CommandFailure::Exit {
                code: Some(1),
                stderr: "not logged in".to_string(),
            }),
        ]);
        model.refresh().await;
        let before = model.current();

        assert!(!model.refresh().await);
        assert_eq!(model.current(), before);
        assert!(before.is_active());
    }
}
