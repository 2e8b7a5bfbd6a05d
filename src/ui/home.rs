//! Document picker

use super::components::{render_list_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::state::UiArea;
use crate::template::catalog::DocumentType;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Widest a picker entry gets
const ENTRY_MAX_WIDTH: u16 = 72;
/// Rows above the first entry (heading + blank line)
const ENTRY_TOP: u16 = 2;

/// Area of the picker entry at `index`, if it fits on screen
pub fn entry_area(screen: Rect, index: usize) -> Option<Rect> {
    let main = UiArea::Main.rect(screen);
    let y = main.y + 1 + ENTRY_TOP + index as u16 * BUTTON_HEIGHT;
    if y + BUTTON_HEIGHT > main.y + main.height {
        return None;
    }
    let x = main.x + 2;
    let width = main.width.saturating_sub(4).min(ENTRY_MAX_WIDTH);
    Some(Rect::new(x, y, width, BUTTON_HEIGHT))
}

/// Index of the picker entry under `(column, row)`
pub fn entry_at(screen: Rect, column: u16, row: u16) -> Option<usize> {
    (0..DocumentType::ALL.len()).find(|&index| {
        entry_area(screen, index).is_some_and(|area| {
            area.contains(ratatui::layout::Position::new(column, row))
        })
    })
}

pub fn draw(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let main = UiArea::Main.rect(screen);
    if main.height == 0 {
        return;
    }

    let heading = Paragraph::new(Line::from(vec![
        Span::styled(
            "Choose a document to draft",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  (click or press the number)",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(heading, Rect::new(main.x + 2, main.y + 1, main.width.saturating_sub(4), 1));

    for (index, doc_type) in DocumentType::ALL.iter().enumerate() {
        let Some(area) = entry_area(screen, index) else {
            break;
        };
        render_list_button(
            frame,
            area,
            &(index + 1).to_string(),
            doc_type.title(),
            doc_type.summary(),
            index == app.state.home_index,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 30,
    };

    #[test]
    fn test_entries_stack_below_heading() {
        assert_eq!(entry_area(SCREEN, 0), Some(Rect::new(2, 6, 72, 3)));
        assert_eq!(entry_area(SCREEN, 1), Some(Rect::new(2, 9, 72, 3)));
    }

    #[test]
    fn test_entry_hit_testing() {
        assert_eq!(entry_at(SCREEN, 10, 7), Some(0));
        assert_eq!(entry_at(SCREEN, 10, 10), Some(1));
        assert_eq!(entry_at(SCREEN, 10, 20), None);
        assert_eq!(entry_at(SCREEN, 90, 7), None);
    }

    #[test]
    fn test_entries_hidden_on_short_terminal() {
        assert_eq!(entry_area(Rect::new(0, 0, 100, 8), 0), None);
    }
}
