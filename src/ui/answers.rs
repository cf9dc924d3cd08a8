//! Answer collection screen: one question at a time

use super::forms::{draw_answer_box, draw_field, draw_inline_error, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::{AUTOFILL_SHORTCUT, VOICE_SHORTCUT};
use crate::state::{AnswerDrafts, Question};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// How a question shows up in the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    AutoFilled,
    Answered,
    Current,
    Empty,
}

impl Segment {
    fn color(self) -> Color {
        match self {
            Self::AutoFilled => Color::Green,
            Self::Answered => Color::Blue,
            Self::Current => Color::Yellow,
            Self::Empty => Color::DarkGray,
        }
    }
}

fn segments(questions: &[Question], drafts: &AnswerDrafts, current: usize) -> Vec<Segment> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, q)| {
            if idx == current {
                Segment::Current
            } else if drafts.is_auto_filled(&q.id) {
                Segment::AutoFilled
            } else if drafts.is_answered(&q.id) {
                Segment::Answered
            } else {
                Segment::Empty
            }
        })
        .collect()
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let questions = &app.state().questions;
    let screen = &app.screens.answers;
    let Some(question) = screen.current(questions) else {
        return;
    };

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
            Constraint::Length(2), // progress
            Constraint::Length(3), // question
            Constraint::Length(5), // answer
            Constraint::Length(1), // voice
            Constraint::Length(3), // suggestion
            Constraint::Length(2), // notice
            Constraint::Min(0),
        ])
        .split(column);

    draw_progress(frame, chunks[0], app);
    draw_question(frame, chunks[1], question, screen.drafts.is_auto_filled(&question.id));

    let listening = app.voice.listening_for() == Some(question.id.as_str());
    let accent = if listening {
        Color::Red
    } else if screen.drafts.is_auto_filled(&question.id) {
        Color::Green
    } else {
        Color::Cyan
    };
    let placeholder = if question.is_document() {
        "Type a note, or upload this document on the next step"
    } else {
        "Type your answer..."
    };
    draw_answer_box(
        frame,
        chunks[2],
        "Your answer",
        screen.drafts.get(&question.id),
        placeholder,
        accent,
    );

    draw_voice_line(frame, chunks[3], app, listening);

    if let Some(suggestion) = screen
        .suggestion
        .as_ref()
        .filter(|s| s.question_id == question.id)
    {
        let lines = vec![
            Line::from(Span::styled(
                format!("💡 {}", suggestion.text),
                Style::default().fg(Color::Yellow),
            )),
            Line::from(Span::styled(
                "Edit your answer, or press Enter to keep it.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[4]);
    }

    draw_inline_error(frame, chunks[5], screen.notice.as_deref());

    if let Some(prompt) = &screen.id_prompt {
        draw_id_prompt(frame, area, prompt, app);
    }
}

fn draw_progress(frame: &mut Frame, area: Rect, app: &App) {
    let questions = &app.state().questions;
    let screen = &app.screens.answers;
    let total = questions.len();

    let mut bar = Vec::with_capacity(total * 2);
    for segment in segments(questions, &screen.drafts, screen.index) {
        bar.push(Span::styled("━━", Style::default().fg(segment.color())));
        bar.push(Span::raw(" "));
    }

    let auto_filled = screen.drafts.auto_filled_count();
    let mut summary = vec![Span::styled(
        format!("Question {} of {}", screen.index + 1, total),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if auto_filled > 0 {
        summary.push(Span::styled(
            format!("   {auto_filled} auto-filled from ID"),
            Style::default().fg(Color::Green),
        ));
    }

    frame.render_widget(
        Paragraph::new(vec![Line::from(summary), Line::from(bar)]),
        area,
    );
}

fn draw_question(frame: &mut Frame, area: Rect, question: &Question, auto_filled: bool) {
    let mut spans = vec![Span::styled(
        question.question.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if question.required {
        spans.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    if question.is_document() {
        spans.push(Span::styled(" [document]", Style::default().fg(Color::Magenta)));
    }
    if auto_filled {
        spans.push(Span::styled(
            "  ✓ auto-filled",
            Style::default().fg(Color::Green),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_voice_line(frame: &mut Frame, area: Rect, app: &App, listening: bool) {
    let line = if listening {
        Line::from(vec![
            Span::styled("● Listening... ", Style::default().fg(Color::Red)),
            Span::styled(
                format!("speak now, {VOICE_SHORTCUT} to stop"),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else if app.voice.is_active() {
        Line::from(Span::styled(
            "Processing speech...",
            Style::default().fg(Color::Yellow),
        ))
    } else if app.voice.is_supported() {
        Line::from(Span::styled(
            format!("🎙 {VOICE_SHORTCUT} to answer by voice"),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_id_prompt(frame: &mut Frame, area: Rect, prompt: &crate::state::FormField, app: &App) {
    let width = 64.min(area.width);
    let height = 10.min(area.height);
    let card = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, card);

    let block = Block::default()
        .title(" Auto-fill from your ID ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Green))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new("Upload a photo of your Aadhaar, PAN or Voter ID to fill matching answers.")
            .wrap(Wrap { trim: true }),
        chunks[0],
    );
    draw_field(frame, chunks[1], prompt, !app.is_busy());

    let hint = if app.is_busy() {
        Span::styled("Reading ID document...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            format!("Enter with no path skips. Reopen any time with {AUTOFILL_SHORTCUT}."),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ExtractedId, FieldType};
    use pretty_assertions::assert_eq;

    fn question(id: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            question: text.to_string(),
            field_type: FieldType::Text,
            required: false,
        }
    }

    #[test]
    fn test_segments_reflect_answer_state() {
        let questions = vec![
            question("1", "Your Name"),
            question("2", "City"),
            question("3", "Phone"),
            question("4", "Remarks"),
        ];
        let mut drafts = AnswerDrafts::default();
        drafts.apply_auto_fill(
            &questions,
            &ExtractedId {
                name: Some("Asha".to_string()),
                ..Default::default()
            },
        );
        drafts.set("2", "Pune");

        assert_eq!(
            segments(&questions, &drafts, 2),
            vec![
                Segment::AutoFilled,
                Segment::Answered,
                Segment::Current,
                Segment::Empty
            ]
        );
    }
}
