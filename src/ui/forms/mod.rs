//! Form rendering module
//!
//! Input boxes shared by the login, upload, answer and document screens.

mod field_renderer;

pub use field_renderer::{draw_answer_box, draw_field, FIELD_HEIGHT};

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Inline error under a field
pub fn draw_inline_error(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let line = Line::from(Span::styled(
            format!("⚠ {message}"),
            Style::default().fg(Color::Red),
        ));
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
    }
}
