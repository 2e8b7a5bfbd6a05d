//! Preview rendering
//!
//! [`render`] is a pure function of the template text, the store and the
//! document schema. The result keeps its pieces as [`Fragment`]s so the
//! terminal preview can lay them out, and prints as markup via `Display`.

use super::catalog::DocumentSchema;
use super::resolver::{is_resolvable, resolve_key};
use super::scanner::scan;
use crate::state::{is_binary_key, FieldStore, FieldValue};
use std::fmt;

/// Class carried by every blank; its absence means all fields are filled
pub const BLANK_CLASS: &str = "placeholder-blank";
/// Class of blanks that take a file upload
pub const BLANK_FILE_CLASS: &str = "placeholder-blank-file";
/// Shown for derived fields that have no value yet
pub const DERIVED_FILLER: &str = "____";
/// Label of upload blanks
pub const UPLOAD_LABEL: &str = "Upload Signature";

/// What a blank asks the user to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankKind {
    /// Fill a text control
    Text,
    /// Upload a file
    Upload,
    /// Placeholder that resolved to no key; links to nothing
    Inert,
}

/// An unfilled placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blank {
    pub key: String,
    pub label: String,
    pub kind: BlankKind,
}

impl Blank {
    /// Text shown in place of the field
    pub fn display_text(&self) -> String {
        format!(" [{}] ", self.label)
    }
}

/// One piece of rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// Template text between placeholders, copied as is
    Literal(&'a str),
    /// Escaped field value
    Value(String),
    /// Inline image from a data URI
    Image(String),
    Blank(Blank),
}

/// Rendered preview
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered<'a> {
    fragments: Vec<Fragment<'a>>,
}

impl<'a> Rendered<'a> {
    pub fn fragments(&self) -> &[Fragment<'a>] {
        &self.fragments
    }

    /// Canonical keys of every linkable blank, in document order
    pub fn blank_keys(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Blank(blank) if blank.kind != BlankKind::Inert => Some(blank.key.as_str()),
            _ => None,
        })
    }

    pub fn blank_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment, Fragment::Blank(_)))
            .count()
    }

    /// No blanks left anywhere in the document
    pub fn is_complete(&self) -> bool {
        self.blank_count() == 0
    }

    /// Markup string for mounting or submission snapshots
    pub fn to_markup(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            match fragment {
                Fragment::Literal(text) => f.write_str(text)?,
                Fragment::Value(value) => f.write_str(value)?,
                Fragment::Image(uri) => {
                    write!(f, r#"<img src="{uri}" class="signature-image" alt="Signature" />"#)?
                }
                Fragment::Blank(blank) => write_blank(f, blank)?,
            }
        }
        Ok(())
    }
}

fn write_blank(f: &mut fmt::Formatter<'_>, blank: &Blank) -> fmt::Result {
    let key = escape_html(&blank.key);
    let label = escape_html(&blank.label);
    match blank.kind {
        BlankKind::Text => write!(
            f,
            r#"<span class="{BLANK_CLASS}" data-key="{key}" title="Click to fill '{label}' in the form"> [{label}] </span>"#
        ),
        BlankKind::Upload => write!(
            f,
            r#"<span class="{BLANK_FILE_CLASS}" data-key="{key}" title="Upload a signature file"> [{label}] </span>"#
        ),
        BlankKind::Inert => write!(f, r#"<span class="{BLANK_CLASS} placeholder-inert"> [] </span>"#),
    }
}

/// Escape the four HTML-reserved characters
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `template` against the current store
pub fn render<'a>(template: &'a str, store: &FieldStore, schema: &DocumentSchema) -> Rendered<'a> {
    let mut fragments = Vec::new();
    let mut cursor = 0;

    for token in scan(template) {
        if token.span.start > cursor {
            fragments.push(Fragment::Literal(&template[cursor..token.span.start]));
        }
        cursor = token.span.end;

        let key = resolve_key(token.label, store, &schema.aliases);
        fragments.push(substitute(key, store, schema));
    }

    if cursor < template.len() {
        fragments.push(Fragment::Literal(&template[cursor..]));
    }

    Rendered { fragments }
}

fn substitute<'a>(key: String, store: &FieldStore, schema: &DocumentSchema) -> Fragment<'a> {
    if !is_resolvable(&key) {
        tracing::trace!("Placeholder resolved to no key");
        return Fragment::Blank(Blank {
            key,
            label: String::new(),
            kind: BlankKind::Inert,
        });
    }

    let value = store.get(&key).filter(|value| !value.is_empty());

    if schema.is_derived(&key) {
        let text = value.map(FieldValue::display).unwrap_or_else(|| DERIVED_FILLER.to_string());
        return Fragment::Value(escape_html(&text));
    }

    let binary = is_binary_key(&key);
    match value {
        Some(value) if binary => Fragment::Image(value.display()),
        Some(value) => Fragment::Value(escape_html(&value.display())),
        None if binary => Fragment::Blank(Blank {
            key,
            label: UPLOAD_LABEL.to_string(),
            kind: BlankKind::Upload,
        }),
        None => {
            let label = schema.friendly_label(&key);
            Fragment::Blank(Blank {
                key,
                label,
                kind: BlankKind::Text,
            })
        }
    }
}
