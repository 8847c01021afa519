//! Status bar
//!
//! Displays push channel status, the last local error and key hints.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use taxi_app::{Presentation, SubscriptionStatus};

/// Render the status bar.
pub fn render(frame: &mut Frame, presentation: &Presentation, area: Rect) {
    let label = presentation.subscription.label();
    let subscription = match presentation.subscription {
        SubscriptionStatus::Connecting => Span::styled(label, Style::default().fg(Color::Yellow)),
        SubscriptionStatus::Live => {
            Span::styled(label, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        },
        SubscriptionStatus::Failed(_) | SubscriptionStatus::Offline => {
            Span::styled(label, Style::default().fg(Color::Red))
        },
    };

    let mut spans = vec![Span::raw(" "), subscription];
    if let Some(error) = &presentation.error {
        spans.push(Span::styled(format!(" | {error}"), Style::default().fg(Color::LightRed)));
    }
    spans.push(Span::styled(
        " | Tab: next  Enter: select  Esc: quit",
        Style::default().fg(Color::Gray),
    ));

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
