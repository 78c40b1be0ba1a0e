//! Local filesystem attachment storage.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use assettrack_core::error::{AppError, ErrorKind};
use assettrack_core::result::AppResult;
use assettrack_core::traits::AttachmentStorage;

/// Stores attachments as flat files under one directory.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStorage {
    root: PathBuf,
}

impl LocalAttachmentStorage {
    /// Create the provider, creating the root directory if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create uploads directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory of the stored files.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Resolve a stored file name. Names are flat: separators and
    /// parent references are rejected.
    fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return Err(AppError::validation(format!(
                "Invalid attachment file name '{filename}'"
            )));
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl AttachmentStorage for LocalAttachmentStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn store(&self, filename: &str, data: Bytes) -> AppResult<()> {
        let path = self.resolve(filename)?;
        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write attachment: {filename}"),
                e,
            )
        })?;
        debug!(filename, bytes = data.len(), "Stored attachment");
        Ok(())
    }

    async fn retrieve(&self, filename: &str) -> AppResult<Bytes> {
        let path = self.resolve(filename)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Attachment not found: {filename}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read attachment: {filename}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn remove(&self, filename: &str) -> AppResult<()> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(filename, "Removed attachment");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete attachment: {filename}"),
                e,
            )),
        }
    }

    async fn exists(&self, filename: &str) -> AppResult<bool> {
        let path = self.resolve(filename)?;
        Ok(fs::try_exists(&path).await?)
    }
}
