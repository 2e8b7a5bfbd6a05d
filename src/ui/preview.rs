//! Preview panel
//!
//! Rendered markup is flowed into terminal lines: block tags break lines,
//! `style`/`script`/`head` content is dropped and entities are decoded.
//! Blanks stay atomic and are recorded as hit regions so pointer positions
//! map back to canonical keys.

use crate::app::App;
use crate::state::UiArea;
use crate::template::render::{BlankKind, Fragment, Rendered};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Shown in place of an inline signature image
pub const IMAGE_PLACEHOLDER: &str = "[signature attached]";

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "br", "section", "article",
    "header", "footer", "table", "ul", "ol",
];

/// Tags followed by an empty line
const PARAGRAPH_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "table", "ul", "ol"];

const SKIPPED_TAGS: &[&str] = &["style", "script", "head"];

const BOLD_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "b", "strong"];

/// How a piece of laid-out text is drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Text { bold: bool },
    /// A field value substituted into the template
    Value,
    Blank { key: String, kind: BlankKind },
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

/// Clickable area of a blank within the laid-out preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankRegion {
    pub line: usize,
    pub start: u16,
    /// Exclusive
    pub end: u16,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewLayout {
    pub lines: Vec<Vec<Segment>>,
    pub regions: Vec<BlankRegion>,
}

impl PreviewLayout {
    /// Canonical key of the blank at `(column, line)`
    pub fn blank_at(&self, column: u16, line: usize) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.line == line && column >= r.start && column < r.end)
            .map(|r| r.key.as_str())
    }

    /// Plain text of every line
    #[cfg(test)]
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|segments| segments.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }
}

#[derive(Debug)]
enum ParseState {
    Text,
    Tag(String),
    Comment(String),
    /// Inside a skipped element, until `closing` is seen
    Skip { closing: String, seen: String },
}

struct Flow {
    width: u16,
    layout: PreviewLayout,
    current: Vec<Segment>,
    column: u16,
    pending_space: bool,
    state: ParseState,
    text: String,
    bold_depth: usize,
}

impl Flow {
    fn new(width: u16) -> Self {
        Self {
            width: width.max(1),
            layout: PreviewLayout::default(),
            current: Vec::new(),
            column: 0,
            pending_space: false,
            state: ParseState::Text,
            text: String::new(),
            bold_depth: 0,
        }
    }

    fn markup(&mut self, input: &str) {
        for c in input.chars() {
            let state = std::mem::replace(&mut self.state, ParseState::Text);
            self.state = match state {
                ParseState::Text if c == '<' => {
                    self.flush_text();
                    ParseState::Tag(String::new())
                }
                ParseState::Text => {
                    self.text.push(c);
                    ParseState::Text
                }
                ParseState::Tag(mut buf) => {
                    if c == '>' {
                        self.tag(&buf)
                    } else {
                        buf.push(c);
                        if buf == "!--" {
                            ParseState::Comment(String::new())
                        } else {
                            ParseState::Tag(buf)
                        }
                    }
                }
                ParseState::Comment(mut buf) => {
                    buf.push(c);
                    if buf.ends_with("-->") {
                        ParseState::Text
                    } else {
                        ParseState::Comment(buf)
                    }
                }
                ParseState::Skip { closing, mut seen } => {
                    seen.push(c.to_ascii_lowercase());
                    if seen.ends_with(&closing) {
                        // Let the tag parser swallow the rest of the closing tag
                        ParseState::Tag(closing[1..].to_string())
                    } else {
                        while seen.len() > closing.len() {
                            seen.remove(0);
                        }
                        ParseState::Skip { closing, seen }
                    }
                }
            };
        }
    }

    /// Handle a complete tag body (between `<` and `>`)
    fn tag(&mut self, body: &str) -> ParseState {
        let closing = body.starts_with('/');
        let name: String = body
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if !closing && !body.ends_with('/') {
            if SKIPPED_TAGS.contains(&name.as_str()) {
                return ParseState::Skip {
                    closing: format!("</{name}"),
                    seen: String::new(),
                };
            }
        }

        if BOLD_TAGS.contains(&name.as_str()) {
            if closing {
                self.bold_depth = self.bold_depth.saturating_sub(1);
            } else {
                self.bold_depth += 1;
            }
        }

        if BLOCK_TAGS.contains(&name.as_str()) {
            self.break_line();
            if closing && PARAGRAPH_TAGS.contains(&name.as_str()) {
                self.empty_line();
            }
        }
        ParseState::Text
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.text);
        let bold = self.bold_depth > 0;
        self.words(&decode_entities(&raw), SegmentKind::Text { bold });
    }

    fn words(&mut self, text: &str, kind: SegmentKind) {
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        let mut parts = text.split_whitespace().peekable();
        while let Some(word) = parts.next() {
            self.word(word, kind.clone());
            if parts.peek().is_some() {
                self.pending_space = true;
            }
        }
        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    /// Place an unbreakable unit, wrapping first if it does not fit
    fn word(&mut self, word: &str, kind: SegmentKind) -> (usize, u16) {
        let len = word.chars().count() as u16;
        let space = u16::from(self.pending_space && self.column > 0);
        if self.column > 0 && self.column + space + len > self.width {
            self.break_line();
        } else if space == 1 {
            let space_kind = match kind {
                SegmentKind::Blank { .. } | SegmentKind::Image => SegmentKind::Text { bold: false },
                ref other => other.clone(),
            };
            self.push(" ", space_kind);
        }
        self.pending_space = false;
        let start = self.column;
        self.push(word, kind);
        (self.layout.lines.len(), start)
    }

    fn push(&mut self, text: &str, kind: SegmentKind) {
        self.column = self.column.saturating_add(text.chars().count() as u16);
        if let Some(last) = self.current.last_mut() {
            if last.kind == kind && !matches!(kind, SegmentKind::Blank { .. }) {
                last.text.push_str(text);
                return;
            }
        }
        self.current.push(Segment {
            text: text.to_string(),
            kind,
        });
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.layout.lines.push(std::mem::take(&mut self.current));
        }
        self.column = 0;
        self.pending_space = false;
    }

    fn empty_line(&mut self) {
        if self.layout.lines.last().is_some_and(|line| !line.is_empty()) {
            self.layout.lines.push(Vec::new());
        }
    }

    fn in_text(&self) -> bool {
        matches!(self.state, ParseState::Text)
    }

    fn inline(&mut self, fragment: &Fragment<'_>) {
        if !self.in_text() {
            return;
        }
        self.flush_text();
        match fragment {
            Fragment::Literal(text) => self.markup(text),
            Fragment::Value(value) => self.words(&decode_entities(value), SegmentKind::Value),
            Fragment::Image(_) => {
                self.word(IMAGE_PLACEHOLDER, SegmentKind::Image);
            }
            Fragment::Blank(blank) => {
                let text = blank.display_text().trim().to_string();
                let kind = SegmentKind::Blank {
                    key: blank.key.clone(),
                    kind: blank.kind,
                };
                let (line, start) = self.word(&text, kind);
                if blank.kind != BlankKind::Inert {
                    self.layout.regions.push(BlankRegion {
                        line,
                        start,
                        end: start + text.chars().count() as u16,
                        key: blank.key.clone(),
                    });
                }
            }
        }
    }

    fn finish(mut self) -> PreviewLayout {
        self.flush_text();
        self.break_line();
        while self.layout.lines.last().is_some_and(|line| line.is_empty()) {
            self.layout.lines.pop();
        }
        self.layout
    }
}

/// Lay out rendered markup for a panel `width` columns wide
pub fn layout(rendered: &Rendered<'_>, width: u16) -> PreviewLayout {
    let mut flow = Flow::new(width);
    for fragment in rendered.fragments() {
        match fragment {
            Fragment::Literal(text) => flow.markup(text),
            other => flow.inline(other),
        }
    }
    flow.finish()
}

/// Lay out plain markup, such as a submitted snapshot
pub fn layout_markup(markup: &str, width: u16) -> PreviewLayout {
    let mut flow = Flow::new(width);
    flow.markup(markup);
    flow.finish()
}

/// Decode the entities templates and the renderer produce
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|i| *i <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix('#')
                .and_then(|n| match n.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => n.parse().ok(),
                })
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn segment_style(kind: &SegmentKind, hovered: Option<&str>) -> Style {
    match kind {
        SegmentKind::Text { bold: true } => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        SegmentKind::Text { bold: false } => Style::default().fg(Color::White),
        SegmentKind::Value => Style::default().fg(Color::Green),
        SegmentKind::Image => Style::default().fg(Color::Magenta),
        SegmentKind::Blank { kind: BlankKind::Inert, .. } => Style::default().fg(Color::DarkGray),
        SegmentKind::Blank { key, kind } => {
            let base = match kind {
                BlankKind::Upload => Style::default().fg(Color::Magenta),
                _ => Style::default().fg(Color::Yellow),
            };
            if hovered == Some(key.as_str()) {
                base.bg(Color::DarkGray).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                base.add_modifier(Modifier::UNDERLINED)
            }
        }
    }
}

/// Convert laid-out lines into styled ratatui lines
pub fn styled_lines<'a>(layout: &'a PreviewLayout, hovered: Option<&str>) -> Vec<Line<'a>> {
    layout
        .lines
        .iter()
        .map(|segments| {
            Line::from(
                segments
                    .iter()
                    .map(|s| Span::styled(s.text.as_str(), segment_style(&s.kind, hovered)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

/// Draw the preview panel of the editor
pub fn draw(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let area = UiArea::PreviewPanel.rect(screen);
    let Some(session) = app.state.session.as_ref() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Preview: {} ", session.doc_type().title()));

    let Some(rendered) = session.render() else {
        let loading = Paragraph::new(Line::from(Span::styled(
            "Loading template...",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(loading, area);
        return;
    };

    let inner = UiArea::PreviewPanel.inner(screen);
    let layout = layout(&rendered, inner.width);
    let lines = styled_lines(&layout, app.state.hovered_blank.as_deref());

    let title_right = if rendered.is_complete() {
        Span::styled(" All fields filled ", Style::default().fg(Color::Green))
    } else {
        Span::styled(
            format!(" {} blanks left ", rendered.blank_count()),
            Style::default().fg(Color::Yellow),
        )
    };

    let paragraph = Paragraph::new(lines)
        .block(block.title_bottom(Line::from(title_right).right_aligned()))
        .scroll((app.state.preview_scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Laid-out preview at the current terminal size, for mouse mapping
pub fn current_layout(app: &App, screen: Rect) -> Option<PreviewLayout> {
    let session = app.state.session.as_ref()?;
    let rendered = session.render()?;
    Some(layout(&rendered, UiArea::PreviewPanel.inner(screen).width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FieldStore;
    use crate::template::catalog::DocumentType;
    use crate::template::render::render;

    fn lay_out(template: &str, width: u16) -> PreviewLayout {
        let schema = DocumentType::Founders.schema();
        let store = FieldStore::with_keys(schema.derivations, schema.keys());
        layout(&render(template, &store, schema), width)
    }

    mod flow {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_block_tags_break_lines() {
            let layout = lay_out("<h1>Title</h1><p>First   para</p><div>second</div>", 80);
            assert_eq!(layout.plain_lines(), vec!["Title", "", "First para", "", "second"]);
        }

        #[test]
        fn test_style_and_comments_are_skipped() {
            let layout = lay_out(
                "<head><style>p { color: red; }</style></head><!-- note --><p>Body</p>",
                80,
            );
            assert_eq!(layout.plain_lines(), vec!["Body"]);
        }

        #[test]
        fn test_words_wrap_at_width() {
            let layout = lay_out("<p>aaa bbb ccc</p>", 7);
            assert_eq!(layout.plain_lines(), vec!["aaa bbb", "ccc"]);
        }

        #[test]
        fn test_headings_are_bold() {
            let layout = lay_out("<h2>Terms</h2>plain", 80);
            assert_eq!(layout.lines[0][0].kind, SegmentKind::Text { bold: true });
            assert_eq!(layout.lines[2][0].kind, SegmentKind::Text { bold: false });
        }

        #[test]
        fn test_snapshot_markup_flows_like_the_preview() {
            let rendered_layout = lay_out("<p>Between {{ company.name }} and</p>", 80);
            let schema = DocumentType::Founders.schema();
            let store = FieldStore::with_keys(schema.derivations, schema.keys());
            let markup = render("<p>Between {{ company.name }} and</p>", &store, schema).to_markup();

            let snapshot = layout_markup(&markup, 80);
            assert_eq!(snapshot.plain_lines(), rendered_layout.plain_lines());
            // Blanks in a snapshot are plain text
            assert!(snapshot.regions.is_empty());
        }

        #[test]
        fn test_entities_are_decoded() {
            assert_eq!(decode_entities("A &amp; B &lt;Co&gt; &#39;x&#x27; &bogus"), "A & B <Co> 'x' &bogus");
        }
    }

    mod blanks {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_blank_regions_map_to_keys() {
            let layout = lay_out("<p>Between {{ company.name }} and</p>", 80);
            assert_eq!(layout.plain_lines(), vec!["Between [Company Name] and"]);
            assert_eq!(
                layout.regions,
                vec![BlankRegion {
                    line: 0,
                    start: 8,
                    end: 22,
                    key: "COMPANY_NAME".into(),
                }]
            );
            assert_eq!(layout.blank_at(8, 0), Some("COMPANY_NAME"));
            assert_eq!(layout.blank_at(21, 0), Some("COMPANY_NAME"));
            assert_eq!(layout.blank_at(22, 0), None);
            assert_eq!(layout.blank_at(8, 1), None);
        }

        #[test]
        fn test_blank_wraps_as_one_unit() {
            let layout = lay_out("<p>word {{ founder.name }}</p>", 12);
            assert_eq!(layout.plain_lines(), vec!["word", "[Founder Name]"]);
            assert_eq!(layout.regions[0].line, 1);
            assert_eq!(layout.regions[0].start, 0);
        }

        #[test]
        fn test_inert_blank_has_no_region() {
            let layout = lay_out("<p>x {{ }} y</p>", 80);
            assert!(layout.regions.is_empty());
            assert_eq!(layout.plain_lines(), vec!["x [] y"]);
        }

        #[test]
        fn test_values_keep_surrounding_spacing() {
            let schema = DocumentType::Founders.schema();
            let mut store = FieldStore::with_keys(schema.derivations, schema.keys());
            store.set("COMPANY_NAME", "A & B".into()).unwrap();
            let rendered = render("<p>Hello {{ company.name }}, welcome</p>", &store, schema);
            let layout = layout(&rendered, 80);
            assert_eq!(layout.plain_lines(), vec!["Hello A & B, welcome"]);
            assert_eq!(layout.lines[0][1].kind, SegmentKind::Value);
        }

        #[test]
        fn test_placeholder_inside_attribute_is_not_drawn() {
            let layout = lay_out(r#"<p title="{{ company.name }}">Body</p>"#, 80);
            assert_eq!(layout.plain_lines(), vec!["Body"]);
            assert!(layout.regions.is_empty());
        }
    }
}
