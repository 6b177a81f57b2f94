use std::fmt;

/// What the time tracker reports as running right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveTaskStatus {
    #[default]
    Idle,
    Active { project: String, elapsed: String },
}

impl ActiveTaskStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ActiveTaskStatus::Active { .. })
    }

    pub fn project(&self) -> Option<&str> {
        match self {
            ActiveTaskStatus::Idle => None,
            ActiveTaskStatus::Active { project, .. } => Some(project),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOption {
    pub alias: String,
    pub label: String,
}

impl ProjectOption {
    pub fn new(alias: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            label: label.into(),
        }
    }
}

/// Terminal outcome of one task-switch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchSelection {
    StartOrResume {
        project: ProjectOption,
        comment: Option<String>,
    },
    StopCurrent,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

impl NotificationLevel {
    pub fn label(self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub detail: Option<String>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
            detail: None,
        }
    }

    pub fn error(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.message),
            None => f.write_str(&self.message),
        }
    }
}
