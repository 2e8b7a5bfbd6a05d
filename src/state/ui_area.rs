//! UI area positioning for mouse event handling
//!
//! Drawing and mouse handling both take their rectangles from here so a
//! click always lands where the widget was drawn.
//!
//! ```text
//! Row 0-2:  Header bar (3 rows with borders)
//! Row 3+:   Form panel (left) | Preview panel (right)
//! Bottom:   Status bar (1 row)
//! ```

use ratatui::layout::{Position, Rect};

/// Height of the header bar (top border + content + bottom border)
pub const HEADER_BAR_HEIGHT: u16 = 3;
/// Height of the status bar
pub const STATUS_BAR_HEIGHT: u16 = 1;
/// Share of the width given to the form panel, in percent
pub const FORM_PANEL_PERCENT: u16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiArea {
    HeaderBar,
    /// Everything between the header and the status bar
    Main,
    FormPanel,
    PreviewPanel,
    StatusBar,
}

impl UiArea {
    /// Outer rectangle of this area on a `screen`-sized terminal
    pub fn rect(self, screen: Rect) -> Rect {
        let main_height = screen
            .height
            .saturating_sub(HEADER_BAR_HEIGHT + STATUS_BAR_HEIGHT);
        let main = Rect::new(
            screen.x,
            screen.y + HEADER_BAR_HEIGHT.min(screen.height),
            screen.width,
            main_height,
        );
        let form_width = screen.width * FORM_PANEL_PERCENT / 100;

        match self {
            UiArea::HeaderBar => Rect::new(
                screen.x,
                screen.y,
                screen.width,
                HEADER_BAR_HEIGHT.min(screen.height),
            ),
            UiArea::Main => main,
            UiArea::FormPanel => Rect::new(main.x, main.y, form_width, main.height),
            UiArea::PreviewPanel => Rect::new(
                main.x + form_width,
                main.y,
                screen.width - form_width,
                main.height,
            ),
            UiArea::StatusBar => Rect::new(
                screen.x,
                screen.y + screen.height.saturating_sub(STATUS_BAR_HEIGHT),
                screen.width,
                STATUS_BAR_HEIGHT.min(screen.height),
            ),
        }
    }

    /// Content rectangle inside the area's border
    pub fn inner(self, screen: Rect) -> Rect {
        let outer = self.rect(screen);
        match self {
            UiArea::StatusBar | UiArea::Main => outer,
            _ => Rect::new(
                outer.x + 1,
                outer.y + 1,
                outer.width.saturating_sub(2),
                outer.height.saturating_sub(2),
            ),
        }
    }

    /// Position relative to the content rectangle, if inside it
    pub fn relative(self, screen: Rect, column: u16, row: u16) -> Option<(u16, u16)> {
        let inner = self.inner(screen);
        inner
            .contains(Position::new(column, row))
            .then(|| (column - inner.x, row - inner.y))
    }
}
