//! Layout components (header bar, status bar)

use super::components::{render_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::platform::GENERATE_SHORTCUT;
use crate::state::{TemplateState, UiArea, View};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width of the Generate button in the header bar
const GENERATE_BUTTON_WIDTH: u16 = 18;

/// Generate button area, at the right end of the header bar
pub fn generate_button_area(screen: Rect) -> Rect {
    let header = UiArea::HeaderBar.rect(screen);
    let width = GENERATE_BUTTON_WIDTH.min(header.width);
    Rect::new(
        header.x + header.width - width,
        header.y,
        width,
        BUTTON_HEIGHT.min(header.height),
    )
}

/// Draw the header bar: app name, current document and template status
pub fn draw_header_bar(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let area = UiArea::HeaderBar.rect(screen);

    let mut spans = vec![Span::styled(
        " lexform ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::styled(
        format!("│ {} ", app.state.current_view.title()),
        Style::default().fg(Color::Gray),
    ));

    let document = match app.state.current_view {
        View::Review => app.state.review.as_ref().map(|r| r.doc_type),
        _ => app.state.session.as_ref().map(|s| s.doc_type()),
    };
    if let Some(doc_type) = document {
        spans.push(Span::styled(
            format!("│ {} ", doc_type.title()),
            Style::default().fg(Color::White),
        ));
    }

    if app.state.current_view == View::Editor {
        if let Some(session) = &app.state.session {
            let (label, color) = match session.template() {
                TemplateState::Pending => ("loading template", Color::Yellow),
                TemplateState::Ready(_) => ("template ready", Color::Green),
                TemplateState::Fallback(_) => ("template unavailable", Color::Red),
            };
            spans.push(Span::styled(format!("│ {label}"), Style::default().fg(color)));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);

    if app.state.current_view == View::Editor {
        if let Some(session) = &app.state.session {
            let enabled = !session.submitting && !session.is_loading();
            let label = if session.submitting {
                "Generating..."
            } else {
                "Generate PDF"
            };
            render_button(frame, generate_button_area(screen), label, enabled, enabled);
        }
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = UiArea::StatusBar.rect(frame.area());

    let mut spans = vec![Span::styled(
        format!(" {} ", get_view_hints(app.state.current_view)),
        Style::default().fg(Color::Gray),
    )];

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let quit_hint = " ^C:quit ";
    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    let width = quit_hint.len() as u16;
    let quit_area = Rect {
        x: area.x + area.width.saturating_sub(width),
        y: area.y,
        width: width.min(area.width),
        height: area.height,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(view: View) -> String {
    match view {
        View::Home => "j/k:nav  Enter:open  q:quit".to_string(),
        View::Editor => format!(
            "Tab/↑↓:field  ←→:option  Enter:next/upload  {GENERATE_SHORTCUT}:generate  PgUp/PgDn:scroll  Esc:back"
        ),
        View::Review => "y:copy markup  e:edit  h:home  j/k:scroll".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_button_sits_in_header() {
        let screen = Rect::new(0, 0, 100, 30);
        let button = generate_button_area(screen);
        assert_eq!(button, Rect::new(82, 0, 18, 3));
    }

    #[test]
    fn test_generate_button_on_narrow_terminal() {
        let screen = Rect::new(0, 0, 10, 30);
        assert_eq!(generate_button_area(screen).width, 10);
    }

    #[test]
    fn test_editor_hints_mention_generate() {
        assert!(get_view_hints(View::Editor).contains("generate"));
        assert!(get_view_hints(View::Home).contains("Enter:open"));
    }
}
