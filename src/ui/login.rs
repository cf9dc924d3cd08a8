//! Login screen: animated welcome logo and the details form

use super::components::{button_area, render_button, BUTTON_HEIGHT};
use super::forms::{draw_field, draw_inline_error, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::GUEST_SHORTCUT;
use crate::state::{Form, LoginPhase};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

const LOGO: [&str; 4] = [
    r" ___ _                   _ __   __    _         ",
    r"| _ ) |_  __ _ _ _ __ _| |\ \ / /__ (_)__ ___  ",
    r"| _ \ ' \/ _` | '_/ _` |  _\ V / _ \| / _/ -_) ",
    r"|___/_||_\__,_|_| \__,_|\__|\_/\___/|_\__\___| ",
];

const FEATURES: [(&str, &str); 4] = [
    ("📷", "Scan a photo of any paper form"),
    ("🎙", "Answer each question by typing or speaking"),
    ("🪪", "Auto-fill details from your ID card"),
    ("📄", "Download the filled form as a PDF"),
];

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    match app.screens.login.phase {
        LoginPhase::Welcome => draw_welcome(frame, area, app),
        LoginPhase::Details => draw_details(frame, area, app),
    }
}

fn draw_welcome(frame: &mut Frame, area: Rect, app: &App) {
    let content_height = LOGO.len() as u16 + 2 + FEATURES.len() as u16 + 2 + BUTTON_HEIGHT;
    let top = area.y + area.height.saturating_sub(content_height) / 2;

    draw_logo(frame, area, top, app.welcome.drop_offset);

    // Everything below the logo waits for the drop to finish
    if !app.welcome.is_settled() {
        return;
    }

    let features_y = top + LOGO.len() as u16 + 2;
    let lines: Vec<Line> = FEATURES
        .iter()
        .map(|(icon, text)| {
            Line::from(vec![
                Span::raw(format!("{icon}  ")),
                Span::styled(*text, Style::default().fg(Color::Gray)),
            ])
        })
        .collect();
    let features_area = Rect {
        x: area.x,
        y: features_y,
        width: area.width,
        height: (FEATURES.len() as u16).min(area.bottom().saturating_sub(features_y)),
    };
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        features_area,
    );

    let buttons_y = features_y + FEATURES.len() as u16 + 2;
    if buttons_y + BUTTON_HEIGHT > area.bottom() {
        return;
    }
    let row = Rect {
        x: area.x,
        y: buttons_y,
        width: area.width,
        height: BUTTON_HEIGHT,
    };
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(row);
    let get_started = "Get Started ⏎";
    let guest = format!("Continue as Guest ({GUEST_SHORTCUT})");
    let right_aligned = Rect {
        x: halves[0].right().saturating_sub(24),
        width: 24.min(halves[0].width),
        ..halves[0]
    };
    render_button(frame, button_area(right_aligned, 22), get_started, true, true);
    let left_aligned = Rect {
        x: halves[1].x + 2,
        width: halves[1].width.saturating_sub(2),
        ..halves[1]
    };
    render_button(
        frame,
        Rect {
            width: (guest.chars().count() as u16 + 4).min(left_aligned.width),
            ..left_aligned
        },
        &guest,
        false,
        true,
    );
}

/// Draw the logo `drop_offset` rows above its resting place, clipping
/// whatever is above the content area
fn draw_logo(frame: &mut Frame, area: Rect, rest_y: u16, drop_offset: f32) {
    let logo_width = LOGO.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let offset = if drop_offset.is_finite() {
        drop_offset.round() as i32
    } else {
        i32::from(area.height)
    };
    let y_pos = i32::from(rest_y) - offset;
    let lines_off_top = (i32::from(area.y) - y_pos).max(0) as usize;
    if lines_off_top >= LOGO.len() {
        return;
    }

    let style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let visible: Vec<Line> = LOGO
        .iter()
        .skip(lines_off_top)
        .map(|l| Line::from(Span::styled(*l, style)))
        .collect();
    let render_y = y_pos.max(i32::from(area.y)) as u16;
    let height = (visible.len() as u16).min(area.bottom().saturating_sub(render_y));

    let logo_area = Rect {
        x: area.x + area.width.saturating_sub(logo_width) / 2,
        y: render_y,
        width: logo_width.min(area.width),
        height,
    };
    frame.render_widget(Paragraph::new(visible), logo_area);

    let tagline = "Fill any form with your voice";
    let tagline_y = render_y + height + 1;
    if tagline_y < area.bottom() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                tagline,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center),
            Rect {
                x: area.x,
                y: tagline_y,
                width: area.width,
                height: 1,
            },
        );
    }
}

fn draw_details(frame: &mut Frame, area: Rect, app: &App) {
    let login = &app.screens.login;
    let width = 56.min(area.width);
    let height = 2 + FIELD_HEIGHT * 2 + 4;
    let card = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height: height.min(area.height),
    };

    let block = Block::default()
        .title(" Welcome! Tell us about you ")
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
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(FIELD_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    for index in 0..login.field_count() {
        if let Some(field) = login.get_field(index) {
            draw_field(frame, chunks[index], field, login.active_field() == index);
        }
    }
    draw_inline_error(frame, chunks[2], login.error.as_deref());

    let hint = Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Cyan)),
        Span::raw(" to continue, or "),
        Span::styled(GUEST_SHORTCUT, Style::default().fg(Color::Cyan)),
        Span::raw(" to skip"),
    ]);
    frame.render_widget(
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}
