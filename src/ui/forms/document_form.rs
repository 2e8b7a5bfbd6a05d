//! Form panel of the editor

use super::field_renderer::{draw_control, draw_section_header};
use crate::app::App;
use crate::state::{DocumentSession, FormRow, UiArea};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

/// Filled and total control counts of a section
fn section_progress(session: &DocumentSession, section: usize) -> (usize, usize) {
    let Some(s) = session.form.sections.get(section) else {
        return (0, 0);
    };
    let filled = s
        .controls
        .iter()
        .filter(|c| session.store.get(c.key()).is_some_and(|v| !v.is_empty()))
        .count();
    (filled, s.controls.len())
}

/// Draw the form panel with its collapsible sections
pub fn draw_form_panel(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let area = UiArea::FormPanel.rect(screen);
    let Some(session) = app.state.session.as_ref() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Details ");
    frame.render_widget(block, area);

    let inner = UiArea::FormPanel.inner(screen);
    let form = &session.form;
    let top = i32::from(inner.y) - i32::from(form.scroll);
    let bottom = i32::from(inner.y) + i32::from(inner.height);

    let mut y = top;
    for row in form.rows() {
        let height = row.height();
        let row_top = y;
        y += i32::from(height);
        // Only draw rows that fit entirely
        if row_top < i32::from(inner.y) || row_top + i32::from(height) > bottom {
            continue;
        }
        let rect = Rect::new(inner.x, row_top as u16, inner.width, height);
        match row {
            FormRow::Header(section) => {
                let s = &form.sections[section];
                draw_section_header(frame, rect, s.title, s.expanded, section_progress(session, section));
            }
            FormRow::Control(location) => {
                if let Some(control) = form.control(location) {
                    let value = session.store.get(control.key());
                    draw_control(frame, rect, control, value, form.focus == Some(location));
                }
            }
        }
    }
}
