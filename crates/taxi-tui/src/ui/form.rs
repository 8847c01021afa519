//! Booking form
//!
//! Pickup and dropoff fields with the submit and cancel buttons underneath.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use taxi_app::{Focus, Presentation};

const FIELD_HEIGHT: u16 = 3;
const BUTTONS_HEIGHT: u16 = 1;
const TEXT_OFFSET: u16 = 1; // inside left/top border

/// Rows the form needs.
pub const HEIGHT: u16 = FIELD_HEIGHT * 2 + BUTTONS_HEIGHT;

/// Render the form.
pub fn render(frame: &mut Frame, presentation: &Presentation, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(BUTTONS_HEIGHT),
        ])
        .split(area);

    let [pickup_area, dropoff_area, buttons_area] = chunks.as_ref() else {
        return;
    };

    render_field(
        frame,
        "Pickup address",
        &presentation.pickup_address,
        presentation.focus == Focus::Pickup,
        *pickup_area,
    );
    render_field(
        frame,
        "Drop off address",
        &presentation.dropoff_address,
        presentation.focus == Focus::Dropoff,
        *dropoff_area,
    );
    render_buttons(frame, presentation, *buttons_area);
}

fn render_field(frame: &mut Frame, title: &str, text: &str, focused: bool, area: Rect) {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    frame.render_widget(Paragraph::new(text).block(block), area);

    if focused {
        let text_width = text.chars().count() as u16;
        let max_x = area.x.saturating_add(area.width).saturating_sub(TEXT_OFFSET + 1);
        let cursor_x = area.x.saturating_add(TEXT_OFFSET).saturating_add(text_width).min(max_x);
        let cursor_y = area.y.saturating_add(TEXT_OFFSET);
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_buttons(frame: &mut Frame, presentation: &Presentation, area: Rect) {
    let mut spans = vec![
        Span::raw(" "),
        button("[ Submit ]", Color::Green, presentation.focus == Focus::Submit),
    ];

    if presentation.submitting {
        spans.push(Span::styled(" Submitting...", Style::default().fg(Color::Yellow)));
    }

    if presentation.cancel_visible {
        spans.push(Span::raw("  "));
        spans.push(button("[ Cancel Booking ]", Color::Red, presentation.focus == Focus::Cancel));
        if presentation.cancelling {
            spans.push(Span::styled(" Cancelling...", Style::default().fg(Color::Yellow)));
        }
    }

    if let Some(label) = &presentation.booking_label {
        spans.push(Span::styled(format!("  {label}"), Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn button(label: &'static str, color: Color, focused: bool) -> Span<'static> {
    let style = Style::default().fg(color);
    let style = if focused { style.add_modifier(Modifier::REVERSED | Modifier::BOLD) } else { style };
    Span::styled(label, style)
}
