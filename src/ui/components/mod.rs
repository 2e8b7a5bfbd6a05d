//! Reusable UI components

mod button;
mod dialog;

pub use button::{render_button, render_list_button, BUTTON_HEIGHT};
pub use dialog::render_error_dialog;
