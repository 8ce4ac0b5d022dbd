//! Resume file storage
//!
//! Files are written flat into the resume directory under a generated name
//! `<uuid>_<sanitized original name>`. Only that generated name is stored in
//! the database.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::utils::error::{AppError, AppResult};

const MAX_SANITIZED_NAME_LEN: usize = 100;

/// Resume directory plus the upload rules that apply to it
#[derive(Debug, Clone)]
pub struct ResumeStorage {
    root: PathBuf,
    allowed_extensions: Vec<String>,
    max_bytes: usize,
}

impl ResumeStorage {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            root: config.resume_dir(),
            allowed_extensions: config
                .storage
                .allowed_resume_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_bytes: config.storage.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the resume directory if needed
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create resume directory: {:?}", self.root))
    }

    /// Check the upload's extension against the allowed list
    pub fn check_upload(&self, filename: &str, size: usize) -> AppResult<()> {
        let extension = extension_of(filename)
            .ok_or_else(|| AppError::bad_request("File must have an extension"))?;
        if !self.allowed_extensions.contains(&extension) {
            return Err(AppError::bad_request(format!(
                "File type not allowed. Allowed types: {}",
                self.allowed_extensions.join(", ")
            )));
        }
        if size > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        Ok(())
    }

    /// Write `contents` and return the stored file name
    pub async fn save(&self, original_filename: &str, contents: &[u8]) -> Result<String> {
        self.ensure_dir().await?;
        let stored = stored_name(original_filename);
        let path = self.root.join(&stored);
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write resume: {:?}", path))?;
        debug!(file = %stored, bytes = contents.len(), "Resume stored");
        Ok(stored)
    }

    /// Absolute path of a stored file, refusing anything outside the directory
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        let relative = Path::new(stored);
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(relative)),
            _ => {
                warn!(file = %stored, "Refusing resume path outside storage");
                None
            }
        }
    }

    /// Remove a stored file; a missing file is not an error
    pub async fn remove(&self, stored: &str) -> Result<()> {
        let Some(path) = self.resolve(stored) else {
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove resume: {:?}", path)),
        }
    }
}

/// Lowercased extension, if the name has a non-empty one
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// Reduce a client-supplied file name to a safe single path component
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.len() > MAX_SANITIZED_NAME_LEN {
        cleaned = cleaned[cleaned.len() - MAX_SANITIZED_NAME_LEN..].to_string();
    }
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}

/// Unique stored name for an upload
pub fn stored_name(original_filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(original_filename))
}

/// Content type served for a resume, by extension
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
