//! Backend access: template fetch, document generation and file uploads

mod client;
mod traits;

pub use client::{read_data_uri, write_document, BackendClient};
pub use traits::{DocumentBackend, GenerationRequest, SubmissionError, TemplateLoadError, UploadError};

#[cfg(test)]
pub use traits::MockDocumentBackend;
