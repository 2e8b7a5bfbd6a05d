//! Form control value objects

use crate::state::FieldValue;
use crate::template::catalog::{FieldKind, FieldSpec};

/// Longest accepted `YYYY-MM-DD` input
const DATE_INPUT_LEN: usize = 10;

/// A single form control bound to a canonical key
///
/// The value itself lives in the field store; a control only knows how to
/// edit it. File controls keep the path being typed until the upload starts.
#[derive(Debug, Clone)]
pub struct FormControl {
    pub spec: &'static FieldSpec,
    /// Hovered blank in the preview points at this control
    pub highlighted: bool,
    /// Path typed into a file control
    pub upload_path: String,
    /// File reads for this control still in flight
    pub uploads_in_flight: usize,
}

impl FormControl {
    pub fn new(spec: &'static FieldSpec) -> Self {
        Self {
            spec,
            highlighted: false,
            upload_path: String::new(),
            uploads_in_flight: 0,
        }
    }

    pub fn key(&self) -> &'static str {
        self.spec.key
    }

    pub fn label(&self) -> &'static str {
        self.spec.label
    }

    pub fn is_file(&self) -> bool {
        matches!(self.spec.kind, FieldKind::File)
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads_in_flight > 0
    }

    pub fn is_select(&self) -> bool {
        matches!(self.spec.kind, FieldKind::Select(_))
    }

    /// New value after typing `c`, or `None` if the control ignores it
    pub fn push_char(&self, current: &str, c: char) -> Option<String> {
        let accepted = match self.spec.kind {
            FieldKind::Text => !c.is_control(),
            FieldKind::Number => c.is_ascii_digit(),
            FieldKind::Date => {
                (c.is_ascii_digit() || c == '-') && current.chars().count() < DATE_INPUT_LEN
            }
            FieldKind::Select(_) | FieldKind::File => false,
        };
        accepted.then(|| {
            let mut next = current.to_string();
            next.push(c);
            next
        })
    }

    /// New value after a backspace
    pub fn pop_char(&self, current: &str) -> Option<String> {
        match self.spec.kind {
            FieldKind::Select(_) | FieldKind::File => None,
            _ if current.is_empty() => None,
            _ => {
                let mut next = current.to_string();
                next.pop();
                Some(next)
            }
        }
    }

    /// Next or previous option of a select control
    pub fn cycle_option(&self, current: &str, forward: bool) -> Option<String> {
        let FieldKind::Select(options) = self.spec.kind else {
            return None;
        };
        if options.is_empty() {
            return None;
        }
        let position = options.iter().position(|option| *option == current).unwrap_or(0);
        let next = if forward {
            (position + 1) % options.len()
        } else if position == 0 {
            options.len() - 1
        } else {
            position - 1
        };
        Some(options[next].to_string())
    }

    pub fn push_path_char(&mut self, c: char) {
        if !c.is_control() {
            self.upload_path.push(c);
        }
    }

    pub fn pop_path_char(&mut self) {
        self.upload_path.pop();
    }

    /// Text shown inside the control box
    pub fn display_value(&self, value: Option<&FieldValue>) -> String {
        let has_value = value.is_some_and(|v| !v.is_empty());
        match self.spec.kind {
            FieldKind::File => {
                if self.is_uploading() {
                    "(reading file...)".to_string()
                } else if !self.upload_path.is_empty() {
                    self.upload_path.clone()
                } else if has_value {
                    "(signature attached)".to_string()
                } else {
                    String::new()
                }
            }
            FieldKind::Select(_) if !has_value => self.spec.hint.to_string(),
            _ => value.map(FieldValue::display).unwrap_or_default(),
        }
    }
}
