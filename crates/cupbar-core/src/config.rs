use crate::cli::DEFAULT_PROGRAM;
use crate::error::ConfigError;
use crate::presenter::{
    StatusLineStyle, DEFAULT_IDLE_TEXT, DEFAULT_REFRESH_INTERVAL, DEFAULT_STATUS_GLYPH,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "CUPBAR_CONFIG_PATH";
pub const ENV_PROGRAM: &str = "CUPBAR_PROGRAM";
pub const ENV_REFRESH_SECS: &str = "CUPBAR_REFRESH_SECS";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CupbarConfig {
    pub program: String,
    pub refresh_interval_secs: u64,
    pub status_glyph: String,
    pub idle_text: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CupbarConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            status_glyph: DEFAULT_STATUS_GLYPH.to_string(),
            idle_text: DEFAULT_IDLE_TEXT.to_string(),
            log_dir: None,
        }
    }
}

impl CupbarConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `CUPBAR_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup(ENV_PROGRAM).filter(|value| !value.trim().is_empty()) {
            self.program = program.trim().to_string();
        }
        if let Some(secs) = lookup(ENV_REFRESH_SECS) {
            self.refresh_interval_secs =
                secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_REFRESH_SECS,
                    value: secs.clone(),
                })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "program",
                value: self.program.clone(),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "refresh_interval_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn status_line_style(&self) -> StatusLineStyle {
        StatusLineStyle {
            glyph: self.status_glyph.clone(),
            idle_text: self.idle_text.clone(),
        }
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| state_dir().join("cupbar"))
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var(ENV_CONFIG_PATH) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    config_dir().join("cupbar/config.toml")
}

fn state_dir() -> PathBuf {
    if let Ok(path) = env::var("XDG_STATE_HOME") {
        return PathBuf::from(path);
    }
    home_dir().join(".local/state")
}

fn config_dir() -> PathBuf {
    if let Ok(path) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path);
    }
    home_dir().join(".config")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
