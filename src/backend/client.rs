//! HTTP client for the template and document generation backend

use super::traits::{DocumentBackend, GenerationRequest, SubmissionError, TemplateLoadError, UploadError};
use crate::config::LexformConfig;
use crate::template::catalog::DocumentType;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("lexform/", env!("CARGO_PKG_VERSION"));

/// Client for the document backend
pub struct BackendClient {
    http: Client,
    base_url: String,
    /// Local template directory taking precedence over the backend
    template_dir: Option<PathBuf>,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        template_dir: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            template_dir,
        })
    }

    pub fn from_config(config: &LexformConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.backend_url(),
            config.template_dir.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn read_local_template(dir: &Path, doc: DocumentType) -> Result<String, TemplateLoadError> {
        let path = dir.join(format!("{}.html", doc.slug()));
        tracing::debug!("Reading template from {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateLoadError::Io { path, source })
    }
}

#[async_trait]
impl DocumentBackend for BackendClient {
    async fn fetch_template(&self, doc: DocumentType) -> Result<String, TemplateLoadError> {
        if let Some(dir) = &self.template_dir {
            return Self::read_local_template(dir, doc).await;
        }

        let url = self.url(&format!("get-template/{}", doc.slug()));
        tracing::debug!("GET {url}");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TemplateLoadError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn generate_document(&self, request: GenerationRequest) -> Result<Vec<u8>, SubmissionError> {
        let url = self.url("generate");
        tracing::debug!(
            "POST {url} ({}, {} fields)",
            request.document_type,
            request.context.len()
        );
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SubmissionError::EmptyDocument);
        }
        Ok(bytes.to_vec())
    }
}

/// Error body returned by the backend
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "msg")]
    error: String,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => "no details from backend".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// MIME type of an uploadable image, by extension
fn image_mime(path: &Path) -> Result<&'static str, UploadError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        _ => Err(UploadError::UnsupportedType(if ext.is_empty() {
            path.display().to_string()
        } else {
            ext
        })),
    }
}

/// Read an image file into a `data:` URI
pub async fn read_data_uri(path: &Path) -> Result<String, UploadError> {
    let mime = image_mime(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Write a generated document into `dir`, creating it if needed
pub async fn write_document(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, SubmissionError> {
    let path = dir.join(name);
    let save_err = |source: std::io::Error| SubmissionError::Save {
        path: path.clone(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(save_err)?;
    tokio::fs::write(&path, bytes).await.map_err(save_err)?;
    Ok(path)
}
