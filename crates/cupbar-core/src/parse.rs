//! Parsers for the two plain-text reports of the time tracker.
//!
//! Both parsers are total: unknown or malformed input degrades to
//! [`ActiveTaskStatus::Idle`] or to dropped lines, never to an error. The
//! tool's output is not a versioned contract, so the workflow only sees the
//! [`ReportFormat`] trait and a structured format can replace [`TextReports`]
//! later without touching it.

use crate::model::{ActiveTaskStatus, ProjectOption};
use regex::Regex;
use std::sync::OnceLock;

/// Glyph the `today` report puts in front of the running timer.
pub const IN_PROGRESS_MARKER: char = '⌛';

pub trait ReportFormat: Send + Sync {
    fn active_status(&self, stdout: &str) -> ActiveTaskStatus;
    fn project_listing(&self, stdout: &str) -> Vec<ProjectOption>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextReports;

impl ReportFormat for TextReports {
    fn active_status(&self, stdout: &str) -> ActiveTaskStatus {
        parse_active_status(stdout)
    }

    fn project_listing(&self, stdout: &str) -> Vec<ProjectOption> {
        parse_project_listing(stdout)
    }
}

/// Finds the first `<project> | ⌛<elapsed>` line.
pub fn parse_active_status(stdout: &str) -> ActiveTaskStatus {
    stdout
        .lines()
        .filter(|line| line.contains(IN_PROGRESS_MARKER))
        .find_map(parse_in_progress_line)
        .unwrap_or(ActiveTaskStatus::Idle)
}

/// Only the field between the first and second `|` is the elapsed time.
fn parse_in_progress_line(line: &str) -> Option<ActiveTaskStatus> {
    let mut fields = line.split('|');
    let project = fields.next()?;
    let elapsed = fields.next()?.replacen(IN_PROGRESS_MARKER, "", 1);
    Some(ActiveTaskStatus::Active {
        project: project.trim().to_string(),
        elapsed: elapsed.trim().to_string(),
    })
}

fn listing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\S+)\s+(.*?)\s+\(ID:\s*(\d+)\)$").expect("valid regex")
    })
}

/// Parses `<alias> <label> (ID: <n>)` lines, keeping their order.
pub fn parse_project_listing(stdout: &str) -> Vec<ProjectOption> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let captures = listing_pattern().captures(line)?;
            Some(ProjectOption::new(&captures[1], &captures[2]))
        })
        .collect()
}
