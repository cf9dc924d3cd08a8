//! Layout components (header, status bar)

use crate::app::App;
use crate::platform::{
    AUTOFILL_SHORTCUT, GUEST_SHORTCUT, NEXT_SHORTCUT, PREV_SHORTCUT, SUBMIT_SHORTCUT,
    VOICE_SHORTCUT,
};
use crate::state::{LoginPhase, Step};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into header and content, keeping the bottom line
/// for the status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Draw the app title and the step tracker
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let current = app.step();
    let current_index = Step::ALL.iter().position(|s| *s == current).unwrap_or(0);

    let mut spans = vec![
        Span::styled(
            " BharatVoice ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    for (idx, step) in Step::ALL.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
        }
        let style = if idx == current_index {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if idx < current_index {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if idx < current_index { "✓" } else { "" };
        spans.push(Span::styled(
            format!("{}{} {}", marker, idx + 1, step.label()),
            style,
        ));
    }

    if let Some(user) = &app.state().user {
        spans.push(Span::styled(
            format!("   {}", user.name),
            Style::default().fg(Color::Blue),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::raw(" ")];

    if let Some(kind) = app.busy_with() {
        spans.push(Span::styled(
            format!("⏳ {} ", kind.label()),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::styled("Esc:cancel", Style::default().fg(Color::Gray)));
    } else {
        spans.push(Span::styled(step_hints(app), Style::default().fg(Color::Gray)));
    }

    if app.voice.is_listening() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("● Listening", Style::default().fg(Color::Red)));
    }

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let quit_hint = " ^C:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    // Render quit hint on the right
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Keyboard hints for the current screen
fn step_hints(app: &App) -> String {
    let screens = &app.screens;
    match app.step() {
        Step::Login => match screens.login.phase {
            LoginPhase::Welcome => format!("Enter:get started  {GUEST_SHORTCUT}:guest  q:quit"),
            LoginPhase::Details => {
                format!("Tab:next field  Enter:continue  {GUEST_SHORTCUT}:guest  Esc:back")
            }
        },
        Step::UploadForm => "type a path  Enter:scan form".to_string(),
        Step::AnswerQuestions if screens.answers.id_prompt.is_some() => {
            "type a path  Enter:auto-fill (empty to skip)  Esc:skip".to_string()
        }
        Step::AnswerQuestions => format!(
            "Enter:next  {NEXT_SHORTCUT}/{PREV_SHORTCUT}:nav  {VOICE_SHORTCUT}:voice  \
             {AUTOFILL_SHORTCUT}:auto-fill  {SUBMIT_SHORTCUT}:submit  Esc:back"
        ),
        Step::UploadDocuments if screens.documents.file.is_some() => {
            "type a path  Enter:upload  Esc:cancel".to_string()
        }
        Step::UploadDocuments => {
            format!("j/k:nav  Enter:choose file  {SUBMIT_SHORTCUT}:continue  Esc:back")
        }
        Step::Review if screens.review.saved_to.is_some() => {
            "Enter:download again  c:copy  n:new form  q:quit  Esc:back".to_string()
        }
        Step::Review => "Enter:download PDF  c:copy summary  Esc:back".to_string(),
    }
}
