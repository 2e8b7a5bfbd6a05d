//! Placeholder scanning
//!
//! Finds every `{{ label }}` token in raw template text. Tokens do not nest:
//! an opening marker seen before the closing one restarts the token, and
//! anything that never closes stays literal text.

use std::ops::Range;

/// Opening marker of a placeholder token
pub const OPEN: &str = "{{";
/// Closing marker of a placeholder token
pub const CLOSE: &str = "}}";

/// A placeholder occurrence in the raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte range of the whole token, markers included
    pub span: Range<usize>,
    /// Trimmed inner text
    pub label: &'a str,
}

/// Iterator over the placeholders of a text
///
/// Cheap to clone; calling [`scan`] again always starts from the top.
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    text: &'a str,
    pos: usize,
}

/// Scan `text` for placeholder tokens
pub fn scan(text: &str) -> Placeholders<'_> {
    Placeholders { text, pos: 0 }
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.text.get(self.pos..)?;
            let open = self.pos + rest.find(OPEN)?;
            let inner_start = open + OPEN.len();
            let after_open = &self.text[inner_start..];

            let Some(close_rel) = after_open.find(CLOSE) else {
                // Unterminated: everything from here on is literal
                self.pos = self.text.len();
                return None;
            };

            let inner = &after_open[..close_rel];

            // A second opening marker inside means the first one was literal
            if let Some(reopen) = inner.rfind(OPEN) {
                self.pos = inner_start + reopen;
                continue;
            }

            // `}` inside the label or an empty body is not a token
            if inner.is_empty() || inner.contains('}') {
                self.pos = inner_start;
                continue;
            }

            let end = inner_start + close_rel + CLOSE.len();
            self.pos = end;
            return Some(Placeholder {
                span: open..end,
                label: inner.trim(),
            });
        }
    }
}
