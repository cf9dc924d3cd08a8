//! Supporting document upload screen

use super::forms::{draw_field, draw_inline_error, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let screen = &app.screens.documents;

    let width = 80.min(area.width);
    let column = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        width,
        ..area
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(1),
        ])
        .split(column);

    let uploaded = state
        .document_questions()
        .filter(|q| state.documents.contains_key(&q.question))
        .count();
    let total = state.document_questions().count();
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                "Upload supporting documents",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{uploaded} of {total} uploaded. Documents are optional; {SUBMIT_SHORTCUT} continues."),
                Style::default().fg(Color::DarkGray),
            )),
        ]),
        chunks[0],
    );

    let items: Vec<ListItem> = state
        .document_questions()
        .map(|q| {
            let line = match state.documents.get(&q.question) {
                Some(doc) => Line::from(vec![
                    Span::styled("✓ ", Style::default().fg(Color::Green)),
                    Span::raw(q.question.clone()),
                    Span::styled(
                        format!("  ({})", doc.filename),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                None => Line::from(vec![
                    Span::styled("○ ", Style::default().fg(Color::DarkGray)),
                    Span::raw(q.question.clone()),
                ]),
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected(Some(screen.selected));
    frame.render_stateful_widget(list, chunks[1], &mut list_state);

    if let Some(file) = &screen.file {
        draw_field(frame, chunks[2], file, !app.is_busy());
    } else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Select a document and press Enter to choose its file",
                Style::default().fg(Color::DarkGray),
            )),
            chunks[2],
        );
    }
    draw_inline_error(frame, chunks[3], screen.error.as_deref());
}
