use crate::bridge::UiRequest;
use cupbar_core::probe::{NOT_INSTALLED_MESSAGE, REMEDIATION_URL};
use cupbar_core::{ActiveTaskStatus, CommentRequest, Notification, PickRequest, StatusLineStyle};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::collections::VecDeque;
use tokio::sync::oneshot;
use tracing::debug;

const MAX_NOTIFICATIONS: usize = 6;

/// Something the event loop has to start outside of the app state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SwitchTasks,
    Stop,
    Refresh,
    OpenRemediationLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Ready { version: String },
    Missing { reason: String },
}

pub struct PickState {
    pub request: PickRequest,
    pub list_state: ListState,
    reply: Option<oneshot::Sender<Option<String>>>,
}

pub struct CommentState {
    pub request: CommentRequest,
    pub input: String,
    reply: Option<oneshot::Sender<Option<String>>>,
}

pub enum Mode {
    Normal,
    Picking(PickState),
    Commenting(CommentState),
}

pub struct App {
    pub style: StatusLineStyle,
    pub status: ActiveTaskStatus,
    pub availability: Availability,
    pub mode: Mode,
    pub notifications: VecDeque<Notification>,
    pub workflow_running: bool,
    pub status_area: Option<Rect>,
    should_quit: bool,
}

impl App {
    pub fn new(style: StatusLineStyle, availability: Availability) -> Self {
        let mut app = Self {
            style,
            status: ActiveTaskStatus::Idle,
            availability,
            mode: Mode::Normal,
            notifications: VecDeque::new(),
            workflow_running: false,
            status_area: None,
            should_quit: false,
        };
        if let Availability::Missing { reason } = &app.availability {
            let detail = format!("{reason}. See {REMEDIATION_URL}");
            app.push_notification(Notification::error(NOT_INSTALLED_MESSAGE, detail));
        }
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_available(&self) -> bool {
        matches!(self.availability, Availability::Ready { .. })
    }

    pub fn status_line(&self) -> String {
        match &self.availability {
            Availability::Ready { .. } => self.style.render(&self.status),
            Availability::Missing { .. } => format!("{} unavailable", self.style.glyph),
        }
    }

    pub fn set_status(&mut self, status: ActiveTaskStatus) {
        self.status = status;
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.push_front(notification);
        self.notifications.truncate(MAX_NOTIFICATIONS);
    }

    pub fn apply_request(&mut self, request: UiRequest) {
        match request {
            UiRequest::Pick { request, reply } => {
                let mut list_state = ListState::default();
                if !request.options.is_empty() {
                    list_state.select(Some(0));
                }
                self.replace_mode(Mode::Picking(PickState {
                    request,
                    list_state,
                    reply: Some(reply),
                }));
            }
            UiRequest::Comment { request, reply } => {
                self.replace_mode(Mode::Commenting(CommentState {
                    request,
                    input: String::new(),
                    reply: Some(reply),
                }));
            }
            UiRequest::Notify(notification) => self.push_notification(notification),
            UiRequest::WorkflowFinished => {
                self.workflow_running = false;
                self.replace_mode(Mode::Normal);
            }
        }
    }

    /// A replaced prompt is answered as dismissed.
    fn replace_mode(&mut self, mode: Mode) {
        let previous = std::mem::replace(&mut self.mode, mode);
        match previous {
            Mode::Picking(mut state) => answer(&mut state.reply, None),
            Mode::Commenting(mut state) => answer(&mut state.reply, None),
            Mode::Normal => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return None;
        }
        match &mut self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Picking(state) => {
                match key.code {
                    KeyCode::Esc => self.finish_prompt(None),
                    KeyCode::Enter => {
                        let choice = state
                            .list_state
                            .selected()
                            .and_then(|idx| state.request.options.get(idx))
                            .cloned();
                        if choice.is_some() {
                            self.finish_prompt(choice);
                        }
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        move_selection(&mut state.list_state, state.request.options.len(), 1)
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        move_selection(&mut state.list_state, state.request.options.len(), -1)
                    }
                    _ => {}
                }
                None
            }
            Mode::Commenting(state) => {
                match key.code {
                    KeyCode::Esc => self.finish_prompt(None),
                    KeyCode::Enter => {
                        let input = state.input.clone();
                        self.finish_prompt(Some(input));
                    }
                    KeyCode::Backspace => {
                        state.input.pop();
                    }
                    KeyCode::Char(ch) => state.input.push(ch),
                    _ => {}
                }
                None
            }
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) -> Option<Action> {
        if !matches!(self.mode, Mode::Normal) {
            return None;
        }
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let area = self.status_area?;
        if contains(area, event.column, event.row) {
            return self.trigger(Action::SwitchTasks);
        }
        None
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit();
                None
            }
            KeyCode::Char('s') | KeyCode::Enter => self.trigger(Action::SwitchTasks),
            KeyCode::Char('x') => self.trigger(Action::Stop),
            KeyCode::Char('r') if self.is_available() => Some(Action::Refresh),
            KeyCode::Char('o') if !self.is_available() => Some(Action::OpenRemediationLink),
            _ => None,
        }
    }

    /// Switch and stop are withdrawn while the tracker is missing, and only
    /// one of them runs at a time.
    fn trigger(&mut self, action: Action) -> Option<Action> {
        if !self.is_available() || self.workflow_running {
            debug!(event = "trigger_ignored", action = ?action, busy = self.workflow_running);
            return None;
        }
        self.workflow_running = true;
        Some(action)
    }

    fn finish_prompt(&mut self, value: Option<String>) {
        let previous = std::mem::replace(&mut self.mode, Mode::Normal);
        match previous {
            Mode::Picking(mut state) => answer(&mut state.reply, value),
            Mode::Commenting(mut state) => answer(&mut state.reply, value),
            Mode::Normal => {}
        }
    }

    fn quit(&mut self) {
        self.replace_mode(Mode::Normal);
        self.should_quit = true;
    }
}

fn answer(reply: &mut Option<oneshot::Sender<Option<String>>>, value: Option<String>) {
    if let Some(reply) = reply.take() {
        let _ = reply.send(value);
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let len = len as isize;
    let mut next = current + delta;
    if next < 0 {
        next = len - 1;
    }
    if next >= len {
        next = 0;
    }
    state.select(Some(next as usize));
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
