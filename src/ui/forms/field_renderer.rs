//! Field rendering utilities for forms

use crate::state::{FieldKind, FormField};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by a bordered single-line field
pub const FIELD_HEIGHT: u16 = 3;

/// Draw a bordered single-line input. Empty fields show their placeholder.
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = match field.kind {
        FieldKind::Path => format!(" 📄 {} ", field.label),
        FieldKind::Email => format!(" ✉ {} ", field.label),
        FieldKind::Text => format!(" {} ", field.label),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner_width = area.width.saturating_sub(3) as usize;
    frame.render_widget(
        Paragraph::new(value_line(field.display_value(), field.placeholder, is_active, inner_width))
            .block(block),
        area,
    );
}

/// Draw a bordered answer box; long answers wrap instead of scrolling
pub fn draw_answer_box(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    placeholder: &str,
    accent: Color,
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let line = if value.is_empty() {
        Line::from(vec![
            Span::styled(placeholder.to_string(), placeholder_style()),
            cursor(),
        ])
    } else {
        Line::from(vec![Span::raw(value.to_string()), cursor()])
    };

    frame.render_widget(
        Paragraph::new(line)
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(block),
        area,
    );
}

fn placeholder_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

fn cursor() -> Span<'static> {
    Span::styled("▌", Style::default().fg(Color::Cyan))
}

/// Keep the tail of the value visible when it is wider than the box
fn value_line<'a>(value: &'a str, placeholder: &'a str, is_active: bool, width: usize) -> Line<'a> {
    if value.is_empty() {
        let mut spans = vec![Span::styled(placeholder, placeholder_style())];
        if is_active {
            spans.insert(0, cursor());
        }
        return Line::from(spans);
    }

    let count = value.chars().count();
    let shown = if count > width && width > 1 {
        let skip = count - (width - 1);
        let start = value.char_indices().nth(skip).map(|(i, _)| i).unwrap_or(0);
        format!("…{}", &value[start..])
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![Span::styled(shown, style)];
    if is_active {
        spans.push(cursor());
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_placeholder_when_empty() {
        let line = value_line("", "e.g. ~/form.jpg", false, 40);
        assert_eq!(text_of(&line), "e.g. ~/form.jpg");
    }

    #[test]
    fn test_active_field_shows_cursor() {
        let line = value_line("Asha", "", true, 40);
        assert_eq!(text_of(&line), "Asha▌");
    }

    #[test]
    fn test_long_value_keeps_tail() {
        let line = value_line("/home/user/Pictures/form.jpg", "", false, 10);
        assert_eq!(text_of(&line), "…/form.jpg");
    }
}
