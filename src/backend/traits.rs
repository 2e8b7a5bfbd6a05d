//! Trait abstraction over the document backend to enable mocking in tests

use crate::state::FieldValue;
use crate::template::catalog::DocumentType;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Template could not be fetched; the session renders the fallback template
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("template request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error("could not read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Document generation failed; the form is left untouched so a retry is safe
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation failed ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("backend returned an empty document")]
    EmptyDocument,
    #[error("could not save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Uploaded file could not be turned into a data URI
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Body of a document generation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub document_type: DocumentType,
    /// Flattened copy of the whole field store
    pub context: BTreeMap<String, FieldValue>,
}

/// Backend operations, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Raw template text for a document type
    async fn fetch_template(&self, doc: DocumentType) -> Result<String, TemplateLoadError>;

    /// Render the filled document; returns the PDF bytes
    async fn generate_document(&self, request: GenerationRequest) -> Result<Vec<u8>, SubmissionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generation_request_wire_format() {
        let mut context = BTreeMap::new();
        context.insert("COMPANY_NAME".to_string(), FieldValue::text("Acme"));
        context.insert("NOTICE_PERIOD".to_string(), FieldValue::Number(30));
        context.insert("FOUNDER_NAME".to_string(), FieldValue::Empty);
        let request = GenerationRequest {
            document_type: DocumentType::Founders,
            context,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "document_type": "founders",
                "context": {
                    "COMPANY_NAME": "Acme",
                    "FOUNDER_NAME": null,
                    "NOTICE_PERIOD": 30
                }
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TemplateLoadError::Status(404).to_string(),
            "backend answered with status 404"
        );
        let err = SubmissionError::Rejected {
            status: 500,
            message: "Template file not found".into(),
        };
        assert_eq!(err.to_string(), "generation failed (500): Template file not found");
    }

    #[tokio::test]
    async fn test_mock_backend() {
        let mut backend = MockDocumentBackend::new();
        backend
            .expect_fetch_template()
            .withf(|doc| *doc == DocumentType::Nda)
            .returning(|_| Ok("<p>{{ party.1.name }}</p>".to_string()));

        let text = backend.fetch_template(DocumentType::Nda).await.unwrap();
        assert!(text.contains("party.1.name"));
    }
}
