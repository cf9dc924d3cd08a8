//! Form upload screen

use super::forms::{draw_field, draw_inline_error, FIELD_HEIGHT};
use crate::app::App;
use crate::events::RequestKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let upload = &app.screens.upload;
    let width = 72.min(area.width);
    let height = 16.min(area.height);
    let card = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let block = Block::default()
        .title(" Upload your form ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let intro = vec![
        Line::from("Take a clear photo of the paper form and enter its path."),
        Line::from(Span::styled(
            "The form is read and turned into simple questions for you.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(intro).wrap(Wrap { trim: true }), chunks[0]);

    let scanning = app.busy_with() == Some(RequestKind::ScanForm);
    draw_field(frame, chunks[1], &upload.file, !scanning);
    draw_inline_error(frame, chunks[2], upload.error.as_deref());

    let footer = if scanning {
        Line::from(Span::styled(
            "Reading your form, this can take a little while...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(Span::styled(
            "Supported: JPG, PNG, WEBP, BMP, TIFF",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(footer).alignment(Alignment::Center), chunks[3]);
}
