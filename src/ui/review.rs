//! Review of a submitted document

use super::preview::{layout_markup, styled_lines};
use crate::app::App;
use crate::state::UiArea;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, app: &App) {
    let area = UiArea::Main.rect(frame.area());
    let Some(review) = &app.state.review else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" Submitted: {} ", review.doc_type.title()))
        .title_bottom(
            Line::from(Span::styled(
                format!(" Saved to {} ", review.saved_to.display()),
                Style::default().fg(Color::Green),
            ))
            .right_aligned(),
        );

    let layout = layout_markup(&review.snapshot, area.width.saturating_sub(2));
    let paragraph = Paragraph::new(styled_lines(&layout, None))
        .block(block)
        .scroll((review.scroll, 0));
    frame.render_widget(paragraph, area);
}
