use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// Bytes read back out of the staging area, ready to become a request body.
pub type StagedByteStream = BoxStream<'static, Result<Bytes, io::Error>>;

/// Transient storage for uploads that are in flight to the provider.
#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    async fn store(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
        content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError>;

    async fn open(&self, path: &StoragePath) -> Result<StagedByteStream, StagingStoreError>;

    /// Removes the object. Deleting a path that no longer exists succeeds.
    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError>;

    async fn exists(&self, path: &StoragePath) -> Result<bool, StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
