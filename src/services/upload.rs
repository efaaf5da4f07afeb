//! Featured image storage
//!
//! Images are written to the configured upload directory as
//! `{uuid}.{ext}` and referenced by their public `/uploads/...` URL.

use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Public URL prefix under which the upload directory is served
pub const UPLOAD_URL_PREFIX: &str = "/uploads/";

/// An image received in a multipart body
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Error types for image storage
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid file type: {0}. Only images are allowed")]
    UnsupportedType(String),

    #[error("File too large. Maximum size is {max_mb} MB")]
    TooLarge { max_mb: u64 },

    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes and removes uploaded images
pub struct ImageStore {
    config: UploadConfig,
}

impl ImageStore {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Validate and persist an image, returning its public URL
    pub async fn save(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        if !self.config.is_type_allowed(&upload.content_type) {
            return Err(UploadError::UnsupportedType(upload.content_type.clone()));
        }
        if upload.data.len() as u64 > self.config.max_file_size {
            return Err(UploadError::TooLarge {
                max_mb: self.config.max_file_size / 1024 / 1024,
            });
        }

        fs::create_dir_all(&self.config.path).await?;

        let ext = self.config.get_extension(&upload.content_type);
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.config.path.join(&file_name), &upload.data).await?;

        tracing::debug!(
            original = upload.file_name.as_deref().unwrap_or("unknown"),
            stored = %file_name,
            size = upload.data.len(),
            "Stored uploaded image"
        );

        Ok(format!("{}{}", UPLOAD_URL_PREFIX, file_name))
    }

    /// Delete a previously stored image. Failures are logged, not returned.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.local_path(url) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }

    /// Map a public URL back to a file inside the upload directory.
    ///
    /// Only bare file names are accepted so a stored value can never point
    /// outside the directory.
    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(UPLOAD_URL_PREFIX)?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.config.path.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ImageStore {
        ImageStore::new(UploadConfig {
            path: dir.path().join("uploads"),
            max_file_size: 16,
            ..Default::default()
        })
    }

    fn png(len: usize) -> ImageUpload {
        ImageUpload {
            file_name: Some("cover.png".into()),
            content_type: "image/png".into(),
            data: vec![0u8; len],
        }
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let url = store.save(&png(8)).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let path = store.local_path(&url).unwrap();
        assert!(path.exists());

        store.remove(&url).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_rejects_wrong_type_and_size() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut text = png(4);
        text.content_type = "text/plain".into();
        assert!(matches!(
            store.save(&text).await,
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.save(&png(17)).await,
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_local_path_stays_inside_root() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.local_path("/uploads/abc.png").is_some());
        assert!(store.local_path("/uploads/../secret").is_none());
        assert!(store.local_path("/uploads/nested/abc.png").is_none());
        assert!(store.local_path("https://cdn.example.com/a.png").is_none());
        assert!(store.local_path("/uploads/").is_none());
    }
}
