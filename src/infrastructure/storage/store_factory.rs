use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_staging_store::ObjectStagingStore;

pub struct StagingStoreFactory;

impl StagingStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn StagingStore>, StagingStoreError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                let store = ObjectStagingStore::local(path)?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Memory => Ok(Arc::new(ObjectStagingStore::in_memory())),
        }
    }
}
