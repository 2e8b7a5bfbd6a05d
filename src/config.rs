//! Configuration handling

use anyhow::Result;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default backend address
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Environment override for the backend address
pub const BACKEND_URL_ENV: &str = "LEXFORM_BACKEND_URL";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LexformConfig {
    /// Base URL of the template and generation backend
    pub backend_url: Option<String>,
    /// Read `<slug>.html` templates from here instead of the backend
    pub template_dir: Option<PathBuf>,
    /// Where generated PDFs are written
    pub output_dir: Option<PathBuf>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl LexformConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("io", "lexform", "lexform")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory holding the log file
    pub fn log_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from the user config file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: LexformConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend_url = Some(url.trim().to_string());
            }
        }
        self
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Output directory: configured, else the download dir, else the cwd
    pub fn output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
