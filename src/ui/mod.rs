//! UI module for rendering the TUI

pub mod components;
pub mod forms;
pub mod home;
pub mod layout;
pub mod preview;
mod review;

use crate::app::App;
use crate::state::View;
use components::render_error_dialog;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    layout::draw_header_bar(frame, app);

    match app.state.current_view {
        View::Home => home::draw(frame, app),
        View::Editor => {
            forms::draw_form_panel(frame, app);
            preview::draw(frame, app);
        }
        View::Review => review::draw(frame, app),
    }

    layout::draw_status_bar(frame, app);

    // Errors are modal and drawn last
    if let Some(message) = app.state.current_error() {
        render_error_dialog(frame, message, app.state.pending_errors());
    }
}
