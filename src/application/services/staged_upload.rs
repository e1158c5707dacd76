use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// An audio blob held in the staging store for the duration of one request.
///
/// Call [`StagedUpload::release`] on every modelled exit path. If the value is
/// dropped without being released (a panic, or the handler future being
/// cancelled when the caller disconnects), deletion is spawned onto the
/// current runtime instead.
pub struct StagedUpload {
    store: Arc<dyn StagingStore>,
    path: StoragePath,
    size: u64,
    released: bool,
}

impl StagedUpload {
    pub async fn stage(
        store: Arc<dyn StagingStore>,
        path: StoragePath,
        data: Bytes,
    ) -> Result<Self, StagingStoreError> {
        let content_length = data.len() as u64;
        let body = stream::once(async move { Ok::<_, io::Error>(data) }).boxed();

        let size = store.store(&path, body, Some(content_length)).await?;

        tracing::debug!(path = %path, bytes = size, "Upload staged");

        Ok(Self {
            store,
            path,
            size,
            released: false,
        })
    }

    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn release(mut self) {
        remove_staged(self.store.as_ref(), &self.path).await;
        self.released = true;
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let store = Arc::clone(&self.store);
        let path = self.path.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(path = %path, "Staged upload dropped before release");
                handle.spawn(async move {
                    remove_staged(store.as_ref(), &path).await;
                });
            }
            Err(_) => {
                tracing::warn!(path = %path, "No runtime available, staged upload left behind");
            }
        }
    }
}

async fn remove_staged(store: &dyn StagingStore, path: &StoragePath) {
    match store.delete(path).await {
        Ok(()) => tracing::debug!(path = %path, "Staged upload removed"),
        Err(e) => tracing::error!(path = %path, error = %e, "Failed to remove staged upload"),
    }
}
