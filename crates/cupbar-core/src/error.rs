use std::path::PathBuf;
use thiserror::Error;

/// Why an external command did not produce a usable result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandFailure {
    #[error("failed to run `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("exited with {}: {stderr}", exit_label(.code))]
    Exit { code: Option<i32>, stderr: String },
}

impl CommandFailure {
    /// Text shown to the user as the failure detail.
    pub fn detail(&self) -> String {
        match self {
            CommandFailure::Spawn { message, .. } => message.clone(),
            CommandFailure::Exit { stderr, .. } if !stderr.is_empty() => stderr.clone(),
            CommandFailure::Exit { .. } => self.to_string(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
#[error("`{program} version` failed: {failure}")]
pub struct ProbeError {
    pub program: String,
    #[source]
    pub failure: CommandFailure,
}
