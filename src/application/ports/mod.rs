mod staging_store;
mod transcription_provider;

pub use staging_store::{StagedByteStream, StagingStore, StagingStoreError};
pub use transcription_provider::{ProviderClientError, TranscriptionProvider};
