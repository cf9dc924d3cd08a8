//! Reusable UI components

mod button;
mod dialog;

pub use button::{button_area, render_button, BUTTON_HEIGHT};
pub use dialog::render_error_dialog;
