//! Button component for TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a bordered button
pub fn render_button(frame: &mut Frame, area: Rect, content: &str, is_selected: bool, is_enabled: bool) {
    let border_style = if !is_enabled {
        Style::default().fg(Color::DarkGray)
    } else if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    let text_style = if !is_enabled {
        Style::default().fg(Color::DarkGray)
    } else if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(format!(" {content} ")).style(text_style);
    let block = Block::default().borders(Borders::ALL).border_style(border_style);

    frame.render_widget(paragraph.block(block), area);
}

/// Render a list entry with a shortcut key, title and a dimmed detail line
pub fn render_list_button(
    frame: &mut Frame,
    area: Rect,
    key: &str,
    title: &str,
    detail: &str,
    is_selected: bool,
) {
    let color = if is_selected { Color::Cyan } else { Color::Gray };
    let line = Line::from(vec![
        Span::styled(format!(" {key} "), Style::default().fg(Color::Black).bg(color)),
        Span::raw(" "),
        Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {detail}"), Style::default().fg(Color::DarkGray)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    frame.render_widget(Paragraph::new(line).block(block), area);
}
