use crate::app::{App, Availability, Mode};
use crate::theme::{
    notification_color, ACTIVE_STYLE, IDLE_STYLE, KEY_STYLE, PLACEHOLDER_STYLE, SELECTED_STYLE,
};
use cupbar_core::probe::REMEDIATION_URL;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

pub fn render(frame: &mut Frame, app: &mut App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    app.status_area = Some(layout[0]);
    render_status(frame, app, layout[0]);
    render_notifications(frame, app, layout[1]);
    render_footer(frame, app, layout[2]);

    match &mut app.mode {
        Mode::Normal => {}
        Mode::Picking(state) => {
            let area = centered_rect(70, 60, frame.size());
            frame.render_widget(Clear, area);
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(inner(area));
            let block = Block::default()
                .borders(Borders::ALL)
                .title(state.request.title.clone());
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    state.request.placeholder.clone(),
                    PLACEHOLDER_STYLE,
                )),
                sections[0],
            );
            let items: Vec<ListItem> = state
                .request
                .options
                .iter()
                .map(|option| ListItem::new(option.clone()))
                .collect();
            let list = List::new(items)
                .highlight_style(SELECTED_STYLE)
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, sections[1], &mut state.list_state);
        }
        Mode::Commenting(state) => {
            let area = centered_rect(60, 20, frame.size());
            frame.render_widget(Clear, area);
            let line = if state.input.is_empty() {
                Line::from(Span::styled(
                    state.request.placeholder.clone(),
                    PLACEHOLDER_STYLE,
                ))
            } else {
                Line::from(state.input.clone())
            };
            let input = Paragraph::new(line).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(state.request.prompt.clone()),
            );
            frame.render_widget(input, area);
            let (x, y) = comment_cursor(area, &state.input);
            frame.set_cursor(x, y);
        }
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.status.is_active() {
        ACTIVE_STYLE
    } else {
        IDLE_STYLE
    };
    let title = match &app.availability {
        Availability::Ready { version } if !version.is_empty() => format!("CoffeeCup {version}"),
        _ => "CoffeeCup".to_string(),
    };
    let paragraph = Paragraph::new(Span::styled(app.status_line(), style))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn render_notifications(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for notification in &app.notifications {
        let color = notification_color(notification.level);
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", notification.level.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(notification.message.clone()),
        ]));
        if let Some(detail) = &notification.detail {
            lines.push(Line::from(Span::styled(
                format!("    {detail}"),
                PLACEHOLDER_STYLE,
            )));
        }
    }
    if let Availability::Missing { .. } = app.availability {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("Install it from "),
            Span::styled(REMEDIATION_URL, KEY_STYLE),
        ]));
    }
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Notifications"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match (&app.mode, app.is_available()) {
        (Mode::Picking(_), _) => &[("enter", "choose"), ("up/down", "move"), ("esc", "cancel")],
        (Mode::Commenting(_), _) => &[("enter", "submit"), ("esc", "cancel")],
        (Mode::Normal, true) => &[
            ("s/enter", "switch tasks"),
            ("x", "stop"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
        (Mode::Normal, false) => &[("o", "open install page"), ("q", "quit")],
    };
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key}"), KEY_STYLE));
        spans.push(Span::raw(format!(" {label} ")));
    }
    if app.workflow_running && matches!(app.mode, Mode::Normal) {
        spans.push(Span::styled(" working...", PLACEHOLDER_STYLE));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Cursor after the typed text, clamped to the last cell inside the border.
fn comment_cursor(area: Rect, input: &str) -> (u16, u16) {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    (
        x.min(area.right().saturating_sub(2)),
        area.y.saturating_add(1),
    )
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    horizontal[1]
}
