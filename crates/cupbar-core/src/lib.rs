//! Status polling and task switching on top of the CoffeeCup time-tracking CLI.
//!
//! [`StatusModel`] keeps the currently timed project, [`TaskSwitcher`] drives
//! the interactive switch and stop workflows, and [`StatusLineStyle`] turns
//! the status into the one-line affordance. The interactive surface is left
//! to the caller through [`Prompter`] and [`Notifier`].

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod presenter;
pub mod probe;
pub mod runner;
pub mod status;
pub mod workflow;

pub use cli::TrackerCli;
pub use config::CupbarConfig;
pub use error::{CommandFailure, ConfigError, ProbeError};
pub use model::{ActiveTaskStatus, Notification, NotificationLevel, ProjectOption, SwitchSelection};
pub use parse::{ReportFormat, TextReports};
pub use presenter::{spawn_refresh_loop, StatusLineStyle};
pub use runner::{CommandOutput, CommandResult, CommandRunner, ProcessCommandRunner};
pub use status::StatusModel;
pub use workflow::{CommentRequest, Notifier, PickRequest, Prompter, TaskSwitcher};
