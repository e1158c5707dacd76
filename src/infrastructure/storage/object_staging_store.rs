use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{StagedByteStream, StagingStore, StagingStoreError};
use crate::domain::StoragePath;

pub struct ObjectStagingStore {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStagingStore {
    pub fn local(base_path: PathBuf) -> Result<Self, StagingStoreError> {
        std::fs::create_dir_all(&base_path).map_err(StagingStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| StagingStoreError::WriteFailed(e.to_string()))?
            .with_automatic_cleanup(true);
        Ok(Self {
            inner: Arc::new(fs),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }
}

#[async_trait::async_trait]
impl StagingStore for ObjectStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
        _content_length: Option<u64>,
    ) -> Result<u64, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| StagingStoreError::WriteFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(StagingStoreError::Io(e));
                }
            };
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(StagingStoreError::WriteFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| StagingStoreError::WriteFailed(e.to_string()))?;

        Ok(total_bytes)
    }

    async fn open(&self, path: &StoragePath) -> Result<StagedByteStream, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self.inner.get(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StagingStoreError::NotFound(e.to_string()),
            other => StagingStoreError::ReadFailed(other.to_string()),
        })?;

        Ok(result
            .into_stream()
            .map(|chunk| chunk.map_err(io::Error::other))
            .boxed())
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        match self.inner.delete(&store_path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StagingStoreError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool, StagingStoreError> {
        let store_path = StorePath::from(path.as_str());
        match self.inner.head(&store_path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StagingStoreError::ReadFailed(e.to_string())),
        }
    }
}
