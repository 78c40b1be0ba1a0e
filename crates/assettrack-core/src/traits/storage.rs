//! Attachment storage trait for files uploaded against an asset.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for attachment storage backends.
///
/// The lifecycle engine only stores, fetches and removes opaque bytes
/// under a generated file name; it never inspects content.
#[async_trait]
pub trait AttachmentStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Write bytes under the given file name, replacing any existing file.
    async fn store(&self, filename: &str, data: Bytes) -> AppResult<()>;

    /// Read a stored file into memory.
    async fn retrieve(&self, filename: &str) -> AppResult<Bytes>;

    /// Delete a stored file. Deleting a missing file is not an error.
    async fn remove(&self, filename: &str) -> AppResult<()>;

    /// Check whether a file exists.
    async fn exists(&self, filename: &str) -> AppResult<bool>;
}
