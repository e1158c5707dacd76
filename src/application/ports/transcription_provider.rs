use async_trait::async_trait;

use crate::application::ports::StagedByteStream;
use crate::domain::{StatusSnapshot, TranscriptId, UploadUrl};

/// The three calls the relay makes against a hosted transcription service.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Sends the audio bytes and returns the provider's reference to them.
    async fn upload(
        &self,
        audio: StagedByteStream,
        content_length: Option<u64>,
    ) -> Result<UploadUrl, ProviderClientError>;

    async fn submit(&self, audio_url: &UploadUrl) -> Result<TranscriptId, ProviderClientError>;

    async fn fetch_status(
        &self,
        transcript_id: &TranscriptId,
    ) -> Result<StatusSnapshot, ProviderClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderClientError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Parse(String),
}
