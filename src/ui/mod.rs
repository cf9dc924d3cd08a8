//! UI module for rendering the TUI

mod answers;
mod components;
mod documents;
mod forms;
mod layout;
mod login;
mod review;
mod upload_form;

use crate::app::App;
use crate::state::Step;
use components::render_error_dialog;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let (header_area, main_area) = layout::create_layout(area);
    layout::draw_header(frame, header_area, app);

    // Draw main content based on the wizard step
    match app.step() {
        Step::Login => login::draw(frame, main_area, app),
        Step::UploadForm => upload_form::draw(frame, main_area, app),
        Step::AnswerQuestions => answers::draw(frame, main_area, app),
        Step::UploadDocuments => documents::draw(frame, main_area, app),
        Step::Review => review::draw(frame, main_area, app),
    }

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Error dialog sits on top of everything
    if let Some(error) = app.current_error() {
        render_error_dialog(frame, error);
    }
}
