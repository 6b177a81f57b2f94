mod app;
mod bridge;
mod commands;
mod logging;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::{Action, App, Availability};
use bridge::{ChannelNotifier, ChannelPrompter, UiRequest};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use cupbar_core::config::config_path;
use cupbar_core::probe::{probe, REMEDIATION_URL};
use cupbar_core::{
    spawn_refresh_loop, CupbarConfig, Notification, ProcessCommandRunner, ReportFormat,
    StatusModel, TaskSwitcher, TextReports, TrackerCli,
};
use futures_util::StreamExt;
use logging::{init_logging, LogOptions};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "cupbar", version, about = "Status line and task switcher for CoffeeCup")]
struct Args {
    /// Config file, defaults to $XDG_CONFIG_HOME/cupbar/config.toml.
    #[arg(long, env = "CUPBAR_CONFIG_PATH")]
    config: Option<PathBuf>,
    /// Tracker executable name or path.
    #[arg(long)]
    program: Option<String>,
    #[arg(long)]
    refresh_secs: Option<u64>,
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    debug: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Live status line with task switching (default).
    Watch,
    /// Print the status line once.
    Status,
    /// Stop the running task.
    Stop,
    /// List projects as they appear in the switch picker.
    Projects,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let command = args.command.unwrap_or(Command::Watch);

    let log_guard = init_logging(&LogOptions {
        debug: args.debug,
        log_dir: config.resolved_log_dir(),
        allow_stderr: command != Command::Watch,
    });
    debug!(
        event = "startup",
        command = ?command,
        program = %config.program,
        log_file = log_guard.as_ref().is_some_and(|guard| guard.has_file())
    );

    let cli = TrackerCli::new(Arc::new(ProcessCommandRunner), config.program.clone());
    match command {
        Command::Watch => run_watch(&config, cli).await,
        Command::Status => commands::print_status(&config, &cli).await,
        Command::Stop => commands::stop(&cli).await,
        Command::Projects => commands::print_projects(&cli).await,
    }
}

/// File, then `CUPBAR_*` environment, then flags.
fn load_config(args: &Args) -> Result<CupbarConfig> {
    let path = args.config.clone().unwrap_or_else(config_path);
    let mut config = CupbarConfig::load(&path)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(program) = &args.program {
        config.program = program.clone();
    }
    if let Some(secs) = args.refresh_secs {
        config.refresh_interval_secs = secs;
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn run_watch(config: &CupbarConfig, cli: TrackerCli) -> Result<()> {
    let availability = match probe(&cli).await {
        Ok(version) => Availability::Ready { version },
        Err(err) => {
            warn!(event = "tracker_missing", error = %err);
            Availability::Missing {
                reason: err.failure.detail(),
            }
        }
    };

    let format: Arc<dyn ReportFormat> = Arc::new(TextReports);
    let status = Arc::new(StatusModel::new(cli.clone(), format.clone()));
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let switcher = TaskSwitcher::new(
        cli,
        format,
        status.clone(),
        Arc::new(ChannelPrompter::new(ui_tx.clone())),
        Arc::new(ChannelNotifier::new(ui_tx.clone())),
    );
    let mut app = App::new(config.status_line_style(), availability);
    let mut tasks = Tasks {
        refresh_loop: app
            .is_available()
            .then(|| spawn_refresh_loop(status.clone(), config.refresh_interval())),
        ..Tasks::default()
    };

    let mut terminal = setup_terminal().context("failed to set up terminal")?;
    let result = run_app(
        &mut terminal,
        &mut app,
        &mut tasks,
        &status,
        &switcher,
        ui_tx,
        ui_rx,
    )
    .await;
    tasks.abort_all();
    restore_terminal(&mut terminal)?;
    info!(event = "shutdown");
    result
}

#[derive(Default)]
struct Tasks {
    refresh_loop: Option<JoinHandle<()>>,
    manual_refresh: Option<JoinHandle<()>>,
    workflow: Option<JoinHandle<()>>,
}

impl Tasks {
    fn abort_all(&mut self) {
        for handle in [
            self.refresh_loop.take(),
            self.manual_refresh.take(),
            self.workflow.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    tasks: &mut Tasks,
    status: &Arc<StatusModel>,
    switcher: &TaskSwitcher,
    ui_tx: mpsc::UnboundedSender<UiRequest>,
    mut ui_rx: mpsc::UnboundedReceiver<UiRequest>,
) -> Result<()> {
    let mut status_rx = status.subscribe();
    let mut events = EventStream::new();
    app.set_status(status_rx.borrow_and_update().clone());

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;
        if app.should_quit() {
            return Ok(());
        }

        let mut action = None;
        tokio::select! {
            Ok(()) = status_rx.changed() => {
                app.set_status(status_rx.borrow_and_update().clone());
            }
            Some(request) = ui_rx.recv() => {
                app.apply_request(request);
            }
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    action = app.handle_key(key);
                }
                Some(Ok(Event::Mouse(mouse))) => {
                    action = app.handle_mouse(mouse);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            },
        }

        match action {
            Some(Action::SwitchTasks) => {
                let switcher = switcher.clone();
                let tx = ui_tx.clone();
                tasks.workflow = Some(tokio::spawn(async move {
                    let selection = switcher.switch_tasks().await;
                    debug!(event = "switch_finished", selection = ?selection);
                    let _ = tx.send(UiRequest::WorkflowFinished);
                }));
            }
            Some(Action::Stop) => {
                let switcher = switcher.clone();
                let tx = ui_tx.clone();
                tasks.workflow = Some(tokio::spawn(async move {
                    switcher.stop().await;
                    let _ = tx.send(UiRequest::WorkflowFinished);
                }));
            }
            Some(Action::Refresh) => {
                let status = status.clone();
                tasks.manual_refresh = Some(tokio::spawn(async move {
                    status.refresh().await;
                }));
            }
            Some(Action::OpenRemediationLink) => {
                if let Err(err) = open_url(REMEDIATION_URL) {
                    warn!(event = "open_url_failed", url = REMEDIATION_URL, error = %err);
                    app.push_notification(Notification::error(
                        "Could not open the install page.",
                        err.to_string(),
                    ));
                }
            }
            None => {}
        }
    }
}

fn open_url(url: &str) -> io::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    std::process::Command::new(opener)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "program = \"cc\"\nrefresh_interval_secs = 30\n").unwrap();
        let args = Args::parse_from([
            "cupbar",
            "--config",
            path.to_str().unwrap(),
            "--refresh-secs",
            "5",
            "status",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.program, "cc");
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(args.command, Some(Command::Status));
    }

    #[test]
    fn zero_refresh_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "cupbar",
            "--config",
            dir.path().join("missing.toml").to_str().unwrap(),
            "--refresh-secs",
            "0",
        ]);
        assert!(load_config(&args).is_err());
    }
}
