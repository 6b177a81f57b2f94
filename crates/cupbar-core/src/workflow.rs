//! The task-switch workflow and the stop workflow.
//!
//! A switch run is one sequential async task:
//! `ListingFetched -> ProjectChosen -> CommentChosen -> Submitted`, with
//! `Cancelled` reachable from every stage before `Submitted`. Each await on a
//! prompt is a point where the run can end without side effects.

use crate::cli::TrackerCli;
use crate::model::{Notification, ProjectOption, SwitchSelection};
use crate::parse::ReportFormat;
use crate::runner::CommandResult;
use crate::status::StatusModel;
use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

pub const STOP_SENTINEL: &str = "Don't start anything new. Stop the current task.";
pub const PICK_TITLE: &str = "Which project do you want to start/resume?";
pub const PICK_PLACEHOLDER: &str =
    "(select the active project if you just want to add a new comment)";
pub const COMMENT_PROMPT: &str = "Comment";
pub const COMMENT_PLACEHOLDER: &str = "(leave empty to skip)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub title: String,
    pub placeholder: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRequest {
    pub prompt: String,
    pub placeholder: String,
}

/// The interactive surface. `None` means the user dismissed the prompt.
///
/// `comment` must tell an explicit cancel (`None`) apart from an empty
/// submit (`Some("")`).
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn pick(&self, request: PickRequest) -> Option<String>;
    async fn comment(&self, request: CommentRequest) -> Option<String>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ListingFetched,
    ProjectChosen,
    CommentChosen,
    Submitted,
    Cancelled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ListingFetched => "listing_fetched",
            Stage::ProjectChosen => "project_chosen",
            Stage::CommentChosen => "comment_chosen",
            Stage::Submitted => "submitted",
            Stage::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

pub fn option_label(project: &ProjectOption) -> String {
    format!("{} (alias: {})", project.label, project.alias)
}

fn alias_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(alias: (.*?)\)$").expect("valid regex"))
}

/// Recovers the alias from a label built by [`option_label`].
pub fn alias_from_label(label: &str) -> Option<&str> {
    alias_pattern()
        .captures(label)
        .and_then(|captures| captures.get(1))
        .map(|alias| alias.as_str())
}

/// Everything a workflow run needs, shared with the presenter.
#[derive(Clone)]
pub struct TaskSwitcher {
    cli: TrackerCli,
    format: Arc<dyn ReportFormat>,
    status: Arc<StatusModel>,
    prompter: Arc<dyn Prompter>,
    notifier: Arc<dyn Notifier>,
}

impl TaskSwitcher {
    pub fn new(
        cli: TrackerCli,
        format: Arc<dyn ReportFormat>,
        status: Arc<StatusModel>,
        prompter: Arc<dyn Prompter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cli,
            format,
            status,
            prompter,
            notifier,
        }
    }

    /// Runs one switch workflow end to end and returns what it resolved to.
    pub async fn switch_tasks(&self) -> SwitchSelection {
        let selection = self.select().await;
        match &selection {
            SwitchSelection::Cancelled => {}
            SwitchSelection::StopCurrent => self.stop().await,
            SwitchSelection::StartOrResume { project, comment } => {
                self.start(project, comment.as_deref()).await
            }
        }
        selection
    }

    /// Runs the `stop` command without any prompt.
    pub async fn stop(&self) {
        log_stage(Stage::Submitted);
        let result = self.cli.stop().await;
        match mutation_outcome(result) {
            Ok(()) => {
                self.status.refresh().await;
                self.notifier
                    .notify(Notification::info("Stopped task successfully."));
            }
            Err(detail) => self.notifier.notify(Notification::error(
                "Failed to stop the current task!",
                format!("Error: \"{detail}\""),
            )),
        }
    }

    async fn start(&self, project: &ProjectOption, comment: Option<&str>) {
        log_stage(Stage::Submitted);
        let alias = project.alias.as_str();
        let result = self.cli.start(alias, comment).await;
        match mutation_outcome(result) {
            Ok(()) => {
                self.status.refresh().await;
                let message = match comment {
                    Some(comment) => format!(
                        "Started/resumed project \"{alias}\", working on \"{comment}\""
                    ),
                    None => format!("Started/resumed project \"{alias}\""),
                };
                self.notifier.notify(Notification::info(message));
            }
            Err(detail) => self.notifier.notify(Notification::error(
                format!("Failed to start \"{alias}\"!"),
                format!("Error: \"{detail}\""),
            )),
        }
    }

    async fn select(&self) -> SwitchSelection {
        // The failed command is already logged by `TrackerCli`; nothing else is.
        let listing = match self.cli.project_aliases().await {
            Ok(output) => output,
            Err(_) => return SwitchSelection::Cancelled,
        };
        let projects = self.format.project_listing(&listing.stdout);
        log_stage(Stage::ListingFetched);
        debug!(event = "projects_listed", count = projects.len());

        let mut options: Vec<String> = projects.iter().map(option_label).collect();
        options.push(STOP_SENTINEL.to_string());
        let picked = self
            .prompter
            .pick(PickRequest {
                title: PICK_TITLE.to_string(),
                placeholder: PICK_PLACEHOLDER.to_string(),
                options,
            })
            .await;
        let Some(picked) = picked else {
            return cancelled();
        };
        log_stage(Stage::ProjectChosen);

        if picked == STOP_SENTINEL {
            return SwitchSelection::StopCurrent;
        }
        let project = alias_from_label(&picked)
            .and_then(|alias| projects.iter().find(|project| project.alias == alias));
        let Some(project) = project.cloned() else {
            warn!(event = "unknown_project_choice", choice = %picked);
            return cancelled();
        };

        let comment = self
            .prompter
            .comment(CommentRequest {
                prompt: COMMENT_PROMPT.to_string(),
                placeholder: COMMENT_PLACEHOLDER.to_string(),
            })
            .await;
        let Some(comment) = comment else {
            return cancelled();
        };
        log_stage(Stage::CommentChosen);

        let comment = Some(comment).filter(|comment| !comment.is_empty());
        SwitchSelection::StartOrResume { project, comment }
    }
}

fn cancelled() -> SwitchSelection {
    log_stage(Stage::Cancelled);
    SwitchSelection::Cancelled
}

fn log_stage(stage: Stage) {
    debug!(event = "switch_stage", stage = %stage);
}

/// Start and stop print nothing on stderr when they succeed; anything there
/// is treated as a failure even with a zero exit status.
fn mutation_outcome(result: CommandResult) -> Result<(), String> {
    match result {
        Ok(output) if output.stderr.is_empty() => Ok(()),
        Ok(output) => Err(output.stderr),
        Err(failure) => Err(failure.detail()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_label_round_trips_alias() {
        let project = ProjectOption::new("wr", "Writing");
        let label = option_label(&project);
        assert_eq!(label, "Writing (alias: wr)");
        assert_eq!(alias_from_label(&label), Some("wr"));
    }

    #[test]
    fn alias_needs_the_trailing_marker() {
        assert_eq!(alias_from_label("Q3 (planning) (alias: q3)"), Some("q3"));
        assert_eq!(alias_from_label("Writing (alias: wr) draft"), None);
        assert_eq!(alias_from_label(STOP_SENTINEL), None);
    }

    #[test]
    fn zero_exit_with_stderr_is_a_failed_mutation() {
        let result: CommandResult = Ok(crate::runner::CommandOutput {
            stdout: String::new(),
            stderr: "project not found".to_string(),
        });
        assert_eq!(mutation_outcome(result), Err("project not found".to_string()));
    }
}
