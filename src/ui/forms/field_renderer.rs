//! Field rendering utilities for forms

use crate::state::{FieldValue, FormControl};
use crate::template::catalog::FieldKind;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Border colour of a control
fn border_color(is_active: bool, is_highlighted: bool) -> Color {
    match (is_active, is_highlighted) {
        (true, _) => Color::Cyan,
        (false, true) => Color::Yellow,
        (false, false) => Color::DarkGray,
    }
}

/// Draw one form control bound to its current store value
pub fn draw_control(
    frame: &mut Frame,
    area: Rect,
    control: &FormControl,
    value: Option<&FieldValue>,
    is_active: bool,
) {
    let color = border_color(is_active, control.highlighted);
    let display_value = control.display_value(value);
    let placeholder = display_value.is_empty();

    let text = if placeholder && !is_active {
        "(empty)".to_string()
    } else if placeholder {
        control.spec.hint.to_string()
    } else {
        display_value
    };
    let text_style = if placeholder {
        Style::default().fg(Color::DarkGray)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![];
    if control.is_select() {
        spans.push(Span::styled("◂ ", Style::default().fg(color)));
    }
    spans.push(Span::styled(text, text_style));
    match control.spec.kind {
        FieldKind::Select(_) => spans.push(Span::styled(" ▸", Style::default().fg(color))),
        _ if is_active => spans.push(Span::styled("▌", Style::default().fg(Color::Cyan))),
        _ => {}
    }

    let mut block = Block::default()
        .title(format!(" {} ", control.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    if control.highlighted {
        block = block.title_style(Style::default().add_modifier(Modifier::BOLD));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Draw a collapsible section header
pub fn draw_section_header(frame: &mut Frame, area: Rect, title: &str, expanded: bool, filled: (usize, usize)) {
    let marker = if expanded { "▾" } else { "▸" };
    let (done, total) = filled;
    let count_color = if done == total { Color::Green } else { Color::DarkGray };
    let line = Line::from(vec![
        Span::styled(
            format!("{marker} {title} "),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("({done}/{total})"), Style::default().fg(count_color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
