//! Cover-image storage
//!
//! Persists uploaded cover images under the configured directory and hands
//! back the relative path stored on the book record and served statically.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CoverStore {
    dir: PathBuf,
}

impl CoverStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store an uploaded cover image, returning its stored reference
    pub async fn save(
        &self,
        original_filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::Validation(
                "Book name and image are required.".to_string(),
            ));
        }

        if let Some(content_type) = content_type {
            if !content_type.starts_with("image/") {
                return Err(AppError::Validation(
                    "Cover image must be an image file.".to_string(),
                ));
            }
        }

        let filename = match sanitized_extension(original_filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store cover image: {}", e)))?;

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Extension of the uploaded filename, lowercased, if it looks safe to reuse
fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}
