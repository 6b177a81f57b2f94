use cupbar_core::NotificationLevel;
use ratatui::style::{Color, Modifier, Style};

pub const ACTIVE_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const IDLE_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const PLACEHOLDER_STYLE: Style = Style::new()
    .fg(Color::Rgb(146, 131, 116))
    .add_modifier(Modifier::ITALIC);
pub const KEY_STYLE: Style = Style::new().fg(Color::Cyan);

pub fn notification_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => Color::Rgb(131, 165, 152),
        NotificationLevel::Error => Color::Rgb(254, 128, 25),
    }
}
