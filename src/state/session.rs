//! Document session
//!
//! One session per opened document: the template load state, the field
//! store, the form and the highlight coordinator. Background completions are
//! applied here on the UI loop, tagged with the session id so completions
//! for a discarded session can be dropped.

use super::coordinator::{ClickOutcome, HighlightCoordinator, LinkResolutionError};
use super::forms::DocumentForm;
use super::store::{FieldError, FieldStore, FieldValue};
use crate::backend::{GenerationRequest, TemplateLoadError, UploadError};
use crate::template::catalog::{DocumentSchema, DocumentType, FieldKind, InitialValue};
use crate::template::render::{render, Rendered};
use crate::template::resolver::resolve_key;
use crate::template::scanner::scan;
use chrono::NaiveDate;
use uuid::Uuid;

/// Rendered in place of a template that could not be loaded
pub const FALLBACK_TEMPLATE: &str =
    "<p class='text-danger'>Error loading template. Please check the backend connection.</p>";

/// Load state of the session's template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateState {
    /// Fetch in flight; nothing is rendered
    Pending,
    Ready(String),
    /// Fetch failed; the fallback template is rendered
    Fallback(String),
}

impl TemplateState {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Ready(text) => Some(text),
            Self::Fallback(_) => Some(FALLBACK_TEMPLATE),
        }
    }
}

pub struct DocumentSession {
    pub id: Uuid,
    pub schema: &'static DocumentSchema,
    template: TemplateState,
    pub store: FieldStore,
    pub form: DocumentForm,
    pub coordinator: HighlightCoordinator,
    /// A generation request is in flight
    pub submitting: bool,
}

impl DocumentSession {
    /// Open a session with initial values applied as of `today`
    pub fn new(doc_type: DocumentType, today: NaiveDate) -> Self {
        let schema = doc_type.schema();
        let mut store = FieldStore::with_keys(schema.derivations, schema.keys());

        for (key, initial) in schema.initial_values {
            let text = match initial {
                InitialValue::Text(text) => (*text).to_string(),
                InitialValue::Today => today.format("%Y-%m-%d").to_string(),
            };
            let kind = schema.field(key).map(|field| field.kind).unwrap_or(FieldKind::Text);
            if let Err(err) = store.set(key, value_for(kind, text)) {
                tracing::warn!("Skipping initial value for {key}: {err}");
            }
        }

        Self {
            id: Uuid::new_v4(),
            schema,
            template: TemplateState::Pending,
            store,
            form: DocumentForm::from_schema(schema),
            coordinator: HighlightCoordinator::new(),
            submitting: false,
        }
    }

    pub fn doc_type(&self) -> DocumentType {
        self.schema.doc_type
    }

    pub fn template(&self) -> &TemplateState {
        &self.template
    }

    pub fn is_loading(&self) -> bool {
        self.template == TemplateState::Pending
    }

    /// Apply the result of the template fetch
    pub fn template_loaded(&mut self, result: Result<String, TemplateLoadError>) {
        match result {
            Ok(text) => {
                self.seed_template_keys(&text);
                tracing::info!("Template for {} loaded ({} bytes)", self.doc_type(), text.len());
                self.template = TemplateState::Ready(text);
            }
            Err(err) => {
                tracing::error!("Template for {} failed to load: {err}", self.doc_type());
                self.template = TemplateState::Fallback(err.to_string());
            }
        }
    }

    /// Every key a blank can name must exist in the store
    fn seed_template_keys(&mut self, text: &str) {
        let keys: Vec<String> = scan(text)
            .map(|token| resolve_key(token.label, &self.store, &self.schema.aliases))
            .collect();
        for key in keys {
            if !self.store.contains(&key) && !key.is_empty() {
                tracing::debug!("Template references {key} with no control");
            }
            self.store.ensure(&key);
        }
    }

    /// Current preview; `None` while the template is loading
    pub fn render(&self) -> Option<Rendered<'_>> {
        let text = self.template.text()?;
        Some(render(text, &self.store, self.schema))
    }

    /// Markup exactly as currently previewed
    pub fn snapshot(&self) -> Option<String> {
        self.render().map(|rendered| rendered.to_markup())
    }

    #[cfg(test)]
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), FieldError> {
        self.store.set(key, value)
    }

    /// Type a character into the focused control
    pub fn input_char(&mut self, c: char) -> Result<(), FieldError> {
        let Some(control) = self.form.focused_control() else {
            return Ok(());
        };
        if control.is_file() {
            if let Some(control) = self.form.focused_control_mut() {
                control.push_path_char(c);
            }
            return Ok(());
        }
        let (key, kind) = (control.key(), control.spec.kind);
        match control.push_char(&self.current_text(key), c) {
            Some(next) => self.store.set(key, value_for(kind, next)),
            None => Ok(()),
        }
    }

    /// Backspace in the focused control
    pub fn backspace(&mut self) -> Result<(), FieldError> {
        let Some(control) = self.form.focused_control() else {
            return Ok(());
        };
        if control.is_file() {
            if let Some(control) = self.form.focused_control_mut() {
                control.pop_path_char();
            }
            return Ok(());
        }
        let (key, kind) = (control.key(), control.spec.kind);
        match control.pop_char(&self.current_text(key)) {
            Some(next) => self.store.set(key, value_for(kind, next)),
            None => Ok(()),
        }
    }

    /// Step the focused select control through its options
    pub fn cycle_option(&mut self, forward: bool) -> Result<(), FieldError> {
        let Some(control) = self.form.focused_control() else {
            return Ok(());
        };
        let key = control.key();
        match control.cycle_option(&self.current_text(key), forward) {
            Some(next) => self.store.set(key, value_for(FieldKind::Text, next)),
            None => Ok(()),
        }
    }

    fn current_text(&self, key: &str) -> String {
        self.store.get(key).map(FieldValue::display).unwrap_or_default()
    }

    /// Take the path typed into the focused file control and mark it pending
    pub fn begin_upload(&mut self) -> Option<(&'static str, String)> {
        let control = self.form.focused_control_mut()?;
        if !control.is_file() || control.upload_path.trim().is_empty() {
            return None;
        }
        let path = std::mem::take(&mut control.upload_path);
        control.uploads_in_flight += 1;
        Some((control.key(), path.trim().to_string()))
    }

    /// Apply a finished file read; the latest completion wins and the
    /// control stays busy until every read it started has finished
    pub fn upload_completed(
        &mut self,
        key: &str,
        result: Result<String, UploadError>,
    ) -> Result<(), UploadError> {
        if let Some(control) = self.form.control_by_key_mut(key) {
            control.uploads_in_flight = control.uploads_in_flight.saturating_sub(1);
        }
        let uri = result?;
        self.store
            .set(key, FieldValue::DataUri(uri))
            .map_err(|err| UploadError::Rejected(err.to_string()))
    }

    /// Everything the generation service needs
    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            document_type: self.doc_type(),
            context: self.store.snapshot(),
        }
    }

    pub fn pointer_enter(&mut self, key: &str) -> Result<(), LinkResolutionError> {
        self.coordinator.pointer_enter(key, &mut self.form)
    }

    pub fn pointer_leave(&mut self, key: &str) {
        self.coordinator.pointer_leave(key, &mut self.form);
    }

    pub fn click_blank(&mut self, key: &str) -> Result<Option<ClickOutcome>, LinkResolutionError> {
        self.coordinator.click(key, &mut self.form)
    }
}

/// Store value for text typed into a control of `kind`
fn value_for(kind: FieldKind, text: String) -> FieldValue {
    if text.is_empty() {
        return FieldValue::Empty;
    }
    match kind {
        FieldKind::Number => match text.parse::<i64>() {
            Ok(n) => FieldValue::Number(n),
            Err(_) => FieldValue::Text(text),
        },
        _ => FieldValue::Text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ControlLocation, ControlSurface};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn nda() -> DocumentSession {
        DocumentSession::new(DocumentType::Nda, today())
    }

    fn founders() -> DocumentSession {
        DocumentSession::new(DocumentType::Founders, today())
    }

    mod initial_values {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_nda_derives_date_parts_from_today() {
            let session = nda();
            assert_eq!(session.store.get("EFFECTIVE_DATE"), Some(&FieldValue::text("2025-03-05")));
            assert_eq!(session.store.get("EFFECTIVE_DAY"), Some(&FieldValue::Number(5)));
            assert_eq!(session.store.get("EFFECTIVE_MONTH"), Some(&FieldValue::text("March")));
            assert_eq!(session.store.get("EFFECTIVE_YEAR"), Some(&FieldValue::Number(2025)));
        }

        #[test]
        fn test_founders_defaults() {
            let session = founders();
            assert_eq!(session.store.get("NONCOMPETE_PERIOD"), Some(&FieldValue::Number(12)));
            assert_eq!(session.store.get("JURISDICTION_CITY"), Some(&FieldValue::text("Coimbatore")));
            assert_eq!(session.store.get("COMPANY_NAME"), Some(&FieldValue::Empty));
        }

        #[test]
        fn test_sessions_get_distinct_ids() {
            assert_ne!(nda().id, nda().id);
        }
    }

    mod template_loading {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_nothing_renders_while_pending() {
            let session = nda();
            assert!(session.is_loading());
            assert!(session.render().is_none());
            assert!(session.snapshot().is_none());
        }

        #[test]
        fn test_failed_fetch_renders_fallback() {
            let mut session = nda();
            session.template_loaded(Err(TemplateLoadError::Status(500)));
            assert_eq!(session.snapshot().as_deref(), Some(FALLBACK_TEMPLATE));
            assert!(matches!(session.template(), TemplateState::Fallback(_)));
        }

        #[test]
        fn test_unknown_template_keys_are_seeded() {
            let mut session = nda();
            session.template_loaded(Ok("<p>{{ witness name }}</p>".into()));
            assert_eq!(session.store.get("WITNESS_NAME"), Some(&FieldValue::Empty));
        }

        #[test]
        fn test_snapshot_matches_render() {
            let mut session = founders();
            session.template_loaded(Ok("<p>{{ company.name }} / {{ notice.period }}</p>".into()));
            session.set_field("COMPANY_NAME", "A & B <Co>".into()).unwrap();
            assert_eq!(
                session.snapshot().unwrap(),
                "<p>A &amp; B &lt;Co&gt; / 30</p>"
            );
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_typing_into_number_control_stores_number() {
            let mut session = founders();
            session.form.focus = Some(ControlLocation { section: 1, index: 3 });
            session.input_char('4').unwrap();
            session.input_char('2').unwrap();
            session.input_char('x').unwrap();
            assert_eq!(session.store.get("FOUNDER_SALARY"), Some(&FieldValue::Number(42)));

            session.backspace().unwrap();
            session.backspace().unwrap();
            assert_eq!(session.store.get("FOUNDER_SALARY"), Some(&FieldValue::Empty));
        }

        #[test]
        fn test_editing_date_rederives_parts() {
            let mut session = nda();
            session.form.focus = Some(ControlLocation { section: 0, index: 0 });
            session.backspace().unwrap();
            session.input_char('9').unwrap();
            assert_eq!(session.store.get("EFFECTIVE_DAY"), Some(&FieldValue::Number(9)));

            // Half-typed date keeps the last good parts
            session.backspace().unwrap();
            assert_eq!(session.store.get("EFFECTIVE_DAY"), Some(&FieldValue::Number(9)));
        }

        #[test]
        fn test_cycle_select() {
            let mut session = nda();
            session.form.focus = Some(ControlLocation { section: 0, index: 1 });
            session.cycle_option(true).unwrap();
            assert_eq!(
                session.store.get("PROPOSED_TRANSACTION"),
                Some(&FieldValue::text("Merger or Acquisition"))
            );
        }

        #[test]
        fn test_derived_keys_cannot_be_set() {
            let mut session = nda();
            assert!(session.set_field("EFFECTIVE_YEAR", FieldValue::Number(1999)).is_err());
        }

        #[test]
        fn test_no_focus_is_noop() {
            let mut session = nda();
            session.input_char('a').unwrap();
            session.backspace().unwrap();
        }
    }

    mod uploads {
        use super::*;
        use pretty_assertions::assert_eq;

        fn focus_signature(session: &mut DocumentSession) {
            let location = session.form.locate("PARTY_1_SIGNATURE").unwrap();
            session.form.focus = Some(location);
        }

        #[test]
        fn test_begin_upload_takes_typed_path() {
            let mut session = nda();
            focus_signature(&mut session);
            assert!(session.begin_upload().is_none());

            for c in " /tmp/sig.png ".chars() {
                session.input_char(c).unwrap();
            }
            assert_eq!(
                session.begin_upload(),
                Some(("PARTY_1_SIGNATURE", "/tmp/sig.png".to_string()))
            );
            assert!(session.form.focused_control().unwrap().is_uploading());
            assert!(session.form.focused_control().unwrap().upload_path.is_empty());
        }

        #[test]
        fn test_last_completion_wins() {
            let mut session = nda();
            session
                .upload_completed("PARTY_1_SIGNATURE", Ok("data:image/png;base64,Rmlyc3Q=".into()))
                .unwrap();
            session
                .upload_completed("PARTY_1_SIGNATURE", Ok("data:image/png;base64,U2Vjb25k".into()))
                .unwrap();
            assert_eq!(
                session.store.get("PARTY_1_SIGNATURE"),
                Some(&FieldValue::DataUri("data:image/png;base64,U2Vjb25k".into()))
            );
        }

        #[test]
        fn test_failed_upload_keeps_value() {
            let mut session = nda();
            focus_signature(&mut session);
            session.form.focused_control_mut().unwrap().uploads_in_flight = 1;

            let err = session
                .upload_completed("PARTY_1_SIGNATURE", Err(UploadError::UnsupportedType("txt".into())))
                .unwrap_err();
            assert!(matches!(err, UploadError::UnsupportedType(_)));
            assert_eq!(session.store.get("PARTY_1_SIGNATURE"), Some(&FieldValue::Empty));
            assert!(!session.form.focused_control().unwrap().is_uploading());
        }

        #[test]
        fn test_overlapping_uploads_stay_busy_until_all_finish() {
            let mut session = nda();
            focus_signature(&mut session);
            for path in ["/tmp/first.png", "/tmp/second.png"] {
                for c in path.chars() {
                    session.input_char(c).unwrap();
                }
                assert!(session.begin_upload().is_some());
            }
            assert_eq!(session.form.focused_control().unwrap().uploads_in_flight, 2);

            session
                .upload_completed("PARTY_1_SIGNATURE", Ok("data:image/png;base64,Rmlyc3Q=".into()))
                .unwrap();
            let control = session.form.focused_control().unwrap();
            assert!(control.is_uploading());
            assert_eq!(
                control.display_value(session.store.get("PARTY_1_SIGNATURE")),
                "(reading file...)"
            );

            session
                .upload_completed("PARTY_1_SIGNATURE", Ok("data:image/png;base64,U2Vjb25k".into()))
                .unwrap();
            let control = session.form.focused_control().unwrap();
            assert!(!control.is_uploading());
            assert_eq!(
                control.display_value(session.store.get("PARTY_1_SIGNATURE")),
                "(signature attached)"
            );
        }
    }

    mod linking {
        use super::*;
        use pretty_assertions::assert_eq;

        const FOUNDERS_TEMPLATE: &str = include_str!("../../templates/founders.html");
        const NDA_TEMPLATE: &str = include_str!("../../templates/nda.html");

        #[test]
        fn test_every_blank_in_bundled_templates_links_to_a_control() {
            for (doc, template) in [
                (DocumentType::Founders, FOUNDERS_TEMPLATE),
                (DocumentType::Nda, NDA_TEMPLATE),
            ] {
                let mut session = DocumentSession::new(doc, today());
                session.template_loaded(Ok(template.to_string()));
                let keys: Vec<String> = session
                    .render()
                    .unwrap()
                    .blank_keys()
                    .map(str::to_string)
                    .collect();
                assert!(!keys.is_empty());
                for key in keys {
                    let outcome = session.click_blank(&key);
                    assert!(matches!(outcome, Ok(Some(_))), "{doc}: {key}");
                    assert_eq!(session.form.focused_key(), Some(key.as_str()));
                }
            }
        }

        #[test]
        fn test_click_blank_in_collapsed_section() {
            let mut session = founders();
            let outcome = session.click_blank("FOUNDER_NAME").unwrap().unwrap();
            assert!(outcome.expanded);
            assert!(session.form.sections[1].expanded);
            assert_eq!(session.form.focused_key(), Some("FOUNDER_NAME"));
        }

        #[test]
        fn test_blank_for_unknown_key_is_a_link_error() {
            let mut session = founders();
            session.template_loaded(Ok("{{ witness name }}".into()));
            assert!(session.click_blank("WITNESS_NAME").is_err());
        }

        #[test]
        fn test_filling_blank_removes_it() {
            let mut session = founders();
            session.template_loaded(Ok("{{ founder.name }}".into()));
            assert_eq!(session.render().unwrap().blank_count(), 1);
            session.set_field("FOUNDER_NAME", "Ravi".into()).unwrap();
            assert!(session.render().unwrap().is_complete());
        }

        #[test]
        fn test_generation_request_carries_whole_store() {
            let mut session = founders();
            session.set_field("COMPANY_NAME", "Acme".into()).unwrap();
            let request = session.generation_request();
            assert_eq!(request.document_type, DocumentType::Founders);
            assert_eq!(request.context.get("COMPANY_NAME"), Some(&FieldValue::text("Acme")));
            assert_eq!(request.context.len(), session.store.len());
        }
    }
}
