//! Message panels
//!
//! Latest command outcome above the latest push notification.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use taxi_app::Presentation;

const PANEL_MIN_HEIGHT: u16 = 3;

/// Rows the panels need.
pub const MIN_HEIGHT: u16 = PANEL_MIN_HEIGHT * 2;

/// Render both panels.
pub fn render(frame: &mut Frame, presentation: &Presentation, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(PANEL_MIN_HEIGHT), Constraint::Min(PANEL_MIN_HEIGHT)])
        .split(area);

    let [status_area, notification_area] = chunks.as_ref() else {
        return;
    };

    render_panel(
        frame,
        "Status",
        presentation.status_message.as_deref(),
        Color::LightCyan,
        *status_area,
    );
    render_panel(
        frame,
        "Notifications",
        presentation.notification_message.as_deref(),
        Color::LightBlue,
        *notification_area,
    );
}

fn render_panel(frame: &mut Frame, title: &str, message: Option<&str>, color: Color, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);

    let paragraph = Paragraph::new(message.unwrap_or_default())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(block);

    frame.render_widget(paragraph, area);
}
