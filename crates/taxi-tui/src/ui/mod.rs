//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), drawing from the
//! [`taxi_app::Presentation`] view model.

mod form;
mod messages;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::Paragraph,
};
use taxi_app::Presentation;

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const HEADER_HEIGHT: u16 = 1;
    const FORM_HEIGHT: u16 = form::HEIGHT;
    const MESSAGES_MIN_HEIGHT: u16 = messages::MIN_HEIGHT;
    const STATUS_HEIGHT: u16 = 1;

    let presentation = app.presentation();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(FORM_HEIGHT),
            Constraint::Min(MESSAGES_MIN_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [header_area, form_area, messages_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_header(frame, &presentation, *header_area);
    form::render(frame, &presentation, *form_area);
    messages::render(frame, &presentation, *messages_area);
    status::render(frame, &presentation, *status_area);
}

fn render_header(frame: &mut Frame, presentation: &Presentation, area: Rect) {
    let header = Line::from(presentation.rider_label.as_str()).centered();
    let paragraph = Paragraph::new(header).style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(paragraph, area);
}
