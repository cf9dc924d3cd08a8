//! Review screen: everything collected, and the PDF download

use super::components::{button_area, render_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::events::RequestKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let review = &app.screens.review;

    let width = 90.min(area.width);
    let column = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        width,
        ..area
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(1),
        ])
        .split(column);

    let label_style = Style::default().fg(Color::Gray);
    let mut lines = Vec::new();
    if let Some(user) = &state.user {
        lines.push(Line::from(vec![
            Span::styled("Filled by ", label_style),
            Span::styled(
                format!("{} <{}>", user.name, user.email),
                Style::default().fg(Color::Blue),
            ),
        ]));
        lines.push(Line::from(""));
    }

    for question in &state.questions {
        let answer = state.answer_text(&question.id);
        let mut spans = vec![Span::styled(format!("{}: ", question.question), label_style)];
        if answer.trim().is_empty() {
            spans.push(Span::styled(
                "(not answered)",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        } else {
            spans.push(Span::styled(
                answer.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        if state.auto_filled.contains(&question.id) {
            spans.push(Span::styled(" ✓ID", Style::default().fg(Color::Green)));
        }
        lines.push(Line::from(spans));
    }

    if !state.documents.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Documents",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (label, document) in &state.documents {
            lines.push(Line::from(vec![
                Span::styled("📎 ", Style::default().fg(Color::Green)),
                Span::styled(format!("{label}: "), label_style),
                Span::raw(document.filename.clone()),
            ]));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Review your answers ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
        chunks[0],
    );

    let generating = app.busy_with() == Some(RequestKind::GeneratePdf);
    let label = if generating {
        "Generating PDF..."
    } else if review.saved_to.is_some() {
        "Download again ⏎"
    } else {
        "Download PDF ⏎"
    };
    render_button(frame, button_area(chunks[2], 26), label, true, !generating);

    if let Some(path) = &review.saved_to {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Saved to ", Style::default().fg(Color::Green)),
                Span::raw(path.display().to_string()),
                Span::styled("   n: start a new form", Style::default().fg(Color::DarkGray)),
            ]))
            .alignment(ratatui::layout::Alignment::Center),
            chunks[3],
        );
    }
}
