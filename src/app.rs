//! Application state and core logic

use crate::backend::{
    read_data_uri, write_document, DocumentBackend, SubmissionError, TemplateLoadError,
    UploadError,
};
use crate::platform::{is_copy_key, is_generate_key};
use crate::state::{
    AppState, ControlSurface, DocumentSession, FormRow, ReviewState, TemplateState, UiArea, View,
};
use crate::template::catalog::DocumentType;
use crate::ui::{home, layout, preview};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Lines moved per scroll step
const SCROLL_STEP: u16 = 3;
/// Lines moved per page
const PAGE_STEP: u16 = 10;

/// Completion of a background task, applied on the UI loop
#[derive(Debug)]
pub enum AppEvent {
    TemplateLoaded {
        session: Uuid,
        result: Result<String, TemplateLoadError>,
    },
    UploadCompleted {
        session: Uuid,
        key: &'static str,
        result: Result<String, UploadError>,
    },
    SubmissionCompleted {
        session: Uuid,
        /// Preview markup at the moment of submission
        snapshot: String,
        result: Result<PathBuf, SubmissionError>,
    },
}

impl AppEvent {
    fn session(&self) -> Uuid {
        match self {
            Self::TemplateLoaded { session, .. }
            | Self::UploadCompleted { session, .. }
            | Self::SubmissionCompleted { session, .. } => *session,
        }
    }
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Template source and generation service
    backend: Arc<dyn DocumentBackend>,
    /// Where generated documents are written
    output_dir: PathBuf,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    /// Whether the app should quit
    quit: bool,
    /// Feedback shown in the status bar until the next input
    pub status_message: Option<String>,
    /// Terminal size (height, width)
    pub terminal_size: Option<(u16, u16)>,
}

impl App {
    /// Create a new App instance
    pub fn new(backend: Arc<dyn DocumentBackend>, output_dir: PathBuf) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::default(),
            backend,
            output_dir,
            events_tx,
            events_rx,
            quit: false,
            status_message: None,
            terminal_size: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Screen rectangle at the last known terminal size
    fn screen(&self) -> Rect {
        let (height, width) = self.terminal_size.unwrap_or((24, 80));
        Rect::new(0, 0, width, height)
    }

    fn form_height(&self) -> u16 {
        UiArea::FormPanel.inner(self.screen()).height
    }

    /// Open a fresh session for `doc_type` and start loading its template
    pub fn open_document(&mut self, doc_type: DocumentType) {
        let session = DocumentSession::new(doc_type, chrono::Local::now().date_naive());
        let id = session.id;

        self.state.close_session();
        self.state.session = Some(session);
        self.state.review = None;
        self.state.current_view = View::Editor;

        tracing::info!("Opening {doc_type} (session {id}), fetching template");
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.fetch_template(doc_type).await;
            if tx.send(AppEvent::TemplateLoaded { session: id, result }).is_err() {
                tracing::debug!("Template for {doc_type} arrived after shutdown");
            }
        });
    }

    /// Leave the editor and drop the session; pending completions become no-ops
    fn close_document(&mut self) {
        if let Some(session) = &self.state.session {
            tracing::info!("Closing {} (session {})", session.doc_type(), session.id);
        }
        self.state.close_session();
        self.state.current_view = View::Home;
    }

    /// Apply every completion that has arrived
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        let live = self
            .state
            .session
            .as_ref()
            .is_some_and(|session| session.id == event.session());
        if !live {
            tracing::debug!("Dropping completion for discarded session {}", event.session());
            return;
        }

        match event {
            AppEvent::TemplateLoaded { result, .. } => {
                if let Some(session) = self.state.session.as_mut() {
                    session.template_loaded(result);
                    if matches!(session.template(), TemplateState::Fallback(_)) {
                        self.status_message = Some("Template unavailable".to_string());
                    }
                }
            }
            AppEvent::UploadCompleted { key, result, .. } => {
                let Some(session) = self.state.session.as_mut() else {
                    return;
                };
                match session.upload_completed(key, result) {
                    Ok(()) => {
                        tracing::info!("Upload for {key} stored");
                        self.status_message = Some("Signature attached".to_string());
                    }
                    Err(err) => {
                        tracing::warn!("Upload for {key} failed: {err}");
                        self.push_error(format!("Upload failed: {err}"));
                    }
                }
            }
            AppEvent::SubmissionCompleted {
                snapshot, result, ..
            } => {
                let Some(session) = self.state.session.as_mut() else {
                    return;
                };
                session.submitting = false;
                let doc_type = session.doc_type();
                match result {
                    Ok(path) => {
                        tracing::info!("Generated {doc_type} at {}", path.display());
                        self.status_message = Some(format!("Saved to {}", path.display()));
                        self.state.review = Some(ReviewState {
                            doc_type,
                            snapshot,
                            saved_to: path,
                            scroll: 0,
                        });
                        self.state.current_view = View::Review;
                    }
                    Err(err) => {
                        tracing::error!("Generating {doc_type} failed: {err}");
                        self.push_error(format!("Document generation failed: {err}"));
                    }
                }
            }
        }
    }

    /// Send the current document for generation
    pub fn submit(&mut self) {
        let Some(session) = self.state.session.as_mut() else {
            return;
        };
        if session.submitting {
            return;
        }
        let Some(snapshot) = session.snapshot() else {
            self.status_message = Some("Template is still loading".to_string());
            return;
        };

        session.submitting = true;
        let id = session.id;
        let request = session.generation_request();
        let file_name = session.doc_type().download_name();
        tracing::info!(
            "Submitting {} with {} fields",
            request.document_type,
            request.context.len()
        );

        let backend = Arc::clone(&self.backend);
        let dir = self.output_dir.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match backend.generate_document(request).await {
                Ok(bytes) => write_document(&dir, file_name, &bytes).await,
                Err(err) => Err(err),
            };
            let event = AppEvent::SubmissionCompleted {
                session: id,
                snapshot,
                result,
            };
            if tx.send(event).is_err() {
                tracing::debug!("Submission finished after shutdown");
            }
        });
    }

    /// Read the file typed into the focused file control
    fn start_upload(&mut self) {
        let Some(session) = self.state.session.as_mut() else {
            return;
        };
        let Some((key, path)) = session.begin_upload() else {
            self.status_message = Some("Type a file path first".to_string());
            return;
        };
        let id = session.id;
        tracing::info!("Reading {path} for {key}");

        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = read_data_uri(Path::new(&path)).await;
            if tx
                .send(AppEvent::UploadCompleted {
                    session: id,
                    key,
                    result,
                })
                .is_err()
            {
                tracing::debug!("Upload for {key} finished after shutdown");
            }
        });
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Clear any status messages on key press
        self.status_message = None;

        match self.state.current_view {
            View::Home => self.handle_home_key(key),
            View::Editor => self.handle_editor_key(key),
            View::Review => self.handle_review_key(key),
        }
        Ok(())
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Enter => self.open_document(self.state.selected_document()),
            KeyCode::Char(c) => {
                let index = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1));
                let target = index.and_then(|i| Some((i, *DocumentType::ALL.get(i)?)));
                if let Some((index, doc_type)) = target {
                    self.state.home_index = index;
                    self.open_document(doc_type);
                }
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        if is_generate_key(&key) {
            self.submit();
            return;
        }
        let form_height = self.form_height();
        let Some(session) = self.state.session.as_mut() else {
            return;
        };

        let edit = match key.code {
            KeyCode::Esc => {
                self.close_document();
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                session.form.next_control();
                session.form.scroll_to_focus(form_height);
                Ok(())
            }
            KeyCode::BackTab | KeyCode::Up => {
                session.form.prev_control();
                session.form.scroll_to_focus(form_height);
                Ok(())
            }
            KeyCode::Left => session.cycle_option(false),
            KeyCode::Right => session.cycle_option(true),
            KeyCode::Enter => {
                if session.form.focused_control().is_some_and(|c| c.is_file()) {
                    self.start_upload();
                    return;
                }
                session.form.next_control();
                session.form.scroll_to_focus(form_height);
                Ok(())
            }
            KeyCode::Backspace => session.backspace(),
            KeyCode::PageDown => {
                self.state.scroll_preview_down(PAGE_STEP);
                return;
            }
            KeyCode::PageUp => {
                self.state.scroll_preview_up(PAGE_STEP);
                return;
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                session.input_char(c)
            }
            _ => Ok(()),
        };

        if let Err(err) = edit {
            tracing::warn!("Edit rejected: {err}");
            self.push_error(err.to_string());
        }
    }

    fn handle_review_key(&mut self, key: KeyEvent) {
        if is_copy_key(&key) {
            self.copy_snapshot();
            return;
        }
        match key.code {
            KeyCode::Char('e') if self.state.session.is_some() => {
                self.state.current_view = View::Editor;
            }
            KeyCode::Char('h') | KeyCode::Esc => {
                self.state.review = None;
                self.close_document();
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_review(true, 1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_review(false, 1),
            KeyCode::PageDown => self.scroll_review(true, PAGE_STEP),
            KeyCode::PageUp => self.scroll_review(false, PAGE_STEP),
            _ => {}
        }
    }

    fn scroll_review(&mut self, down: bool, lines: u16) {
        if let Some(review) = self.state.review.as_mut() {
            review.scroll = if down {
                review.scroll.saturating_add(lines)
            } else {
                review.scroll.saturating_sub(lines)
            };
        }
    }

    /// Copy the submitted markup to the clipboard
    fn copy_snapshot(&mut self) {
        let Some(snapshot) = self.state.review.as_ref().map(|r| r.snapshot.clone()) else {
            return;
        };
        match copy_to_clipboard(&snapshot) {
            Ok(()) => {
                self.status_message = Some(format!("Copied {} chars", snapshot.chars().count()));
            }
            Err(err) => {
                tracing::warn!("Clipboard unavailable: {err}");
                self.push_error(format!("Could not copy to clipboard: {err}"));
            }
        }
    }

    /// Handle a mouse event
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        if self.state.has_errors() {
            return Ok(());
        }
        if matches!(mouse.kind, MouseEventKind::Down(_)) {
            self.status_message = None;
        }

        match self.state.current_view {
            View::Home => self.handle_home_mouse(mouse),
            View::Editor => self.handle_editor_mouse(mouse),
            View::Review => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_review(true, SCROLL_STEP),
                MouseEventKind::ScrollUp => self.scroll_review(false, SCROLL_STEP),
                _ => {}
            },
        }
        Ok(())
    }

    fn handle_home_mouse(&mut self, mouse: MouseEvent) {
        let Some(index) = home::entry_at(self.screen(), mouse.column, mouse.row) else {
            return;
        };
        match mouse.kind {
            MouseEventKind::Moved => self.state.home_index = index,
            MouseEventKind::Down(MouseButton::Left) => {
                self.state.home_index = index;
                self.open_document(DocumentType::ALL[index]);
            }
            _ => {}
        }
    }

    fn handle_editor_mouse(&mut self, mouse: MouseEvent) {
        let screen = self.screen();
        let position = Position::new(mouse.column, mouse.row);

        if UiArea::PreviewPanel.rect(screen).contains(position) {
            let blank = self.blank_at(screen, mouse.column, mouse.row);
            match mouse.kind {
                MouseEventKind::Moved => self.hover_blank(blank),
                MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(key) = blank {
                        self.click_blank(&key);
                    }
                }
                MouseEventKind::ScrollDown => self.state.scroll_preview_down(SCROLL_STEP),
                MouseEventKind::ScrollUp => self.state.scroll_preview_up(SCROLL_STEP),
                _ => {}
            }
            return;
        }

        // Anywhere else the pointer has left the preview
        if mouse.kind == MouseEventKind::Moved {
            self.hover_blank(None);
        }

        if mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && layout::generate_button_area(screen).contains(position)
        {
            self.submit();
            return;
        }

        if UiArea::FormPanel.rect(screen).contains(position) {
            self.handle_form_mouse(screen, mouse);
        }
    }

    fn handle_form_mouse(&mut self, screen: Rect, mouse: MouseEvent) {
        let Some(session) = self.state.session.as_mut() else {
            return;
        };
        match mouse.kind {
            MouseEventKind::ScrollDown => session.form.scroll_down(),
            MouseEventKind::ScrollUp => session.form.scroll_up(),
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((_, row)) = UiArea::FormPanel.relative(screen, mouse.column, mouse.row)
                else {
                    return;
                };
                match session.form.row_at(row) {
                    Some(FormRow::Header(section)) => session.form.toggle_section(section),
                    Some(FormRow::Control(location)) => session.form.focus_control(location),
                    None => {}
                }
            }
            _ => {}
        }
    }

    /// Canonical key of the blank drawn at a screen position
    fn blank_at(&self, screen: Rect, column: u16, row: u16) -> Option<String> {
        let (x, y) = UiArea::PreviewPanel.relative(screen, column, row)?;
        let layout = preview::current_layout(self, screen)?;
        let line = usize::from(y) + usize::from(self.state.preview_scroll);
        layout.blank_at(x, line).map(str::to_string)
    }

    /// Move the hover to `key`, updating the linked control highlight
    fn hover_blank(&mut self, key: Option<String>) {
        if self.state.hovered_blank == key {
            return;
        }
        let Some(session) = self.state.session.as_mut() else {
            return;
        };
        if let Some(previous) = self.state.hovered_blank.take() {
            session.pointer_leave(&previous);
        }
        if let Some(key) = &key {
            if let Err(err) = session.pointer_enter(key) {
                tracing::error!("Cannot highlight blank: {err}");
            }
        }
        self.state.hovered_blank = key;
    }

    /// Focus the control behind a clicked blank
    fn click_blank(&mut self, key: &str) {
        let form_height = self.form_height();
        let Some(session) = self.state.session.as_mut() else {
            return;
        };
        match session.click_blank(key) {
            Ok(Some(outcome)) => {
                session.form.scroll_to_focus(form_height);
                if outcome.expanded {
                    tracing::debug!("Expanded section {} for {key}", outcome.location.section);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!("Blank link failed: {err}");
                self.push_error(format!("Field not found: {err}"));
            }
        }
    }
}

/// Copy text to the system clipboard
fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
