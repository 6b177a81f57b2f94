use crate::model::ActiveTaskStatus;
use crate::status::StatusModel;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

pub const DEFAULT_STATUS_GLYPH: &str = "🍵";
pub const DEFAULT_IDLE_TEXT: &str = "Idle";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLineStyle {
    pub glyph: String,
    pub idle_text: String,
}

impl Default for StatusLineStyle {
    fn default() -> Self {
        Self {
            glyph: DEFAULT_STATUS_GLYPH.to_string(),
            idle_text: DEFAULT_IDLE_TEXT.to_string(),
        }
    }
}

impl StatusLineStyle {
    pub fn render(&self, status: &ActiveTaskStatus) -> String {
        match status {
            ActiveTaskStatus::Idle => format!("{} {}", self.glyph, self.idle_text),
            ActiveTaskStatus::Active { project, elapsed } => {
                format!("{} {project} {elapsed}", self.glyph)
            }
        }
    }
}

/// Polls the status every `interval` until the handle is aborted.
///
/// The first refresh runs immediately. Each tick starts its own refresh, so a
/// query that never returns does not hold back later ones. Aborting the loop
/// aborts the refreshes still in flight.
pub fn spawn_refresh_loop(status: Arc<StatusModel>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = status.clone();
                    in_flight.spawn(async move {
                        status.refresh().await;
                    });
                }
                Some(_) = in_flight.join_next() => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_renders_placeholder() {
        let style = StatusLineStyle::default();
        assert_eq!(style.render(&ActiveTaskStatus::Idle), "🍵 Idle");
    }

    #[test]
    fn active_renders_glyph_project_and_elapsed() {
        let style = StatusLineStyle {
            glyph: "*".to_string(),
            idle_text: "-".to_string(),
        };
        let status = ActiveTaskStatus::Active {
            project: "Acme Corp".to_string(),
            elapsed: "01:23:45".to_string(),
        };
        assert_eq!(style.render(&status), "* Acme Corp 01:23:45");
    }
}
