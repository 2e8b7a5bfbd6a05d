//! Application state definitions

use super::session::DocumentSession;
use crate::template::catalog::DocumentType;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Document type picker
    #[default]
    Home,
    /// Form and live preview
    Editor,
    /// Snapshot of a submitted document
    Review,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Documents",
            View::Editor => "Editor",
            View::Review => "Review",
        }
    }
}

/// What a generated document looked like when it was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewState {
    pub doc_type: DocumentType,
    /// Preview markup captured at submission time
    pub snapshot: String,
    pub saved_to: PathBuf,
    pub scroll: u16,
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub home_index: usize,

    // Editing
    pub session: Option<DocumentSession>,
    pub preview_scroll: u16,
    /// Key of the blank under the pointer
    pub hovered_blank: Option<String>,

    pub review: Option<ReviewState>,

    // Errors waiting to be shown, oldest first
    errors: VecDeque<String>,
}

impl AppState {
    /// Document type under the cursor on the home view
    pub fn selected_document(&self) -> DocumentType {
        DocumentType::ALL[self.home_index.min(DocumentType::ALL.len() - 1)]
    }

    pub fn move_selection_down(&mut self) {
        if self.home_index + 1 < DocumentType::ALL.len() {
            self.home_index += 1;
        }
    }

    pub fn move_selection_up(&mut self) {
        self.home_index = self.home_index.saturating_sub(1);
    }

    pub fn scroll_preview_down(&mut self, lines: u16) {
        self.preview_scroll = self.preview_scroll.saturating_add(lines);
    }

    pub fn scroll_preview_up(&mut self, lines: u16) {
        self.preview_scroll = self.preview_scroll.saturating_sub(lines);
    }

    /// Queue an error for the error dialog
    pub fn push_error(&mut self, message: String) {
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error currently shown
    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    /// Errors queued behind the current one
    pub fn pending_errors(&self) -> usize {
        self.errors.len().saturating_sub(1)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    /// Drop the open document and everything that belonged to it
    pub fn close_session(&mut self) {
        self.session = None;
        self.preview_scroll = 0;
        self.hovered_blank = None;
    }
}
