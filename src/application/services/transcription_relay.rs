use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::application::ports::{
    ProviderClientError, StagingStore, StagingStoreError, TranscriptionProvider,
};
use crate::application::services::StagedUpload;
use crate::domain::{StoragePath, TranscriptStatus, UploadId};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

/// Drives one upload → submit → poll lifecycle per call.
pub struct TranscriptionRelay<P>
where
    P: TranscriptionProvider,
{
    provider: Arc<P>,
    staging_store: Arc<dyn StagingStore>,
    polling: PollingPolicy,
}

impl<P> TranscriptionRelay<P>
where
    P: TranscriptionProvider,
{
    pub fn new(
        provider: Arc<P>,
        staging_store: Arc<dyn StagingStore>,
        polling: PollingPolicy,
    ) -> Self {
        Self {
            provider,
            staging_store,
            polling,
        }
    }

    pub fn polling(&self) -> PollingPolicy {
        self.polling
    }

    #[tracing::instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub async fn transcribe(&self, audio: Bytes, filename: &str) -> Result<String, RelayError> {
        let path = StoragePath::new(&UploadId::new(), filename);
        let staged = StagedUpload::stage(Arc::clone(&self.staging_store), path, audio).await?;

        let outcome = self.run_lifecycle(&staged).await;
        staged.release().await;

        match &outcome {
            Ok(text) => tracing::info!(chars = text.len(), "Transcription relayed"),
            Err(e) => {
                tracing::warn!(phase = e.phase(), error = %e, "Transcription relay failed")
            }
        }

        outcome
    }

    async fn run_lifecycle(&self, staged: &StagedUpload) -> Result<String, RelayError> {
        let audio = self.staging_store.open(staged.path()).await?;

        let audio_url = self
            .provider
            .upload(audio, Some(staged.size()))
            .await
            .map_err(RelayError::UploadFailed)?;

        tracing::debug!("Audio accepted by provider");

        let transcript_id = self
            .provider
            .submit(&audio_url)
            .await
            .map_err(RelayError::SubmissionFailed)?;

        tracing::debug!(transcript_id = %transcript_id, "Transcription job submitted");

        // Deadline is checked after each status fetch, so the total wait can
        // overrun `max_wait` by one provider round-trip.
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            let snapshot = self
                .provider
                .fetch_status(&transcript_id)
                .await
                .map_err(RelayError::PollFailed)?;
            polls += 1;

            match snapshot.status {
                TranscriptStatus::Completed => {
                    tracing::debug!(polls, "Transcript completed");
                    return Ok(snapshot.text.unwrap_or_default());
                }
                TranscriptStatus::Error => {
                    return Err(RelayError::ProviderError(
                        snapshot
                            .error
                            .unwrap_or_else(|| "unknown provider error".to_string()),
                    ));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {}
            }

            let elapsed = started.elapsed();
            if elapsed > self.polling.max_wait {
                return Err(RelayError::Timeout { waited: elapsed });
            }

            tracing::trace!(status = %snapshot.status, polls, "Transcript not ready");
            tokio::time::sleep(self.polling.interval).await;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to stage upload: {0}")]
    StagingFailed(#[from] StagingStoreError),
    #[error("Upload failed: {0}")]
    UploadFailed(ProviderClientError),
    #[error("Transcription request failed: {0}")]
    SubmissionFailed(ProviderClientError),
    #[error("Error getting transcription result: {0}")]
    PollFailed(ProviderClientError),
    #[error("Transcription error: {0}")]
    ProviderError(String),
    #[error("Transcription timed out.")]
    Timeout { waited: Duration },
}

impl RelayError {
    /// Lifecycle phase the failure belongs to.
    pub fn phase(&self) -> &'static str {
        match self {
            RelayError::StagingFailed(_) => "staging",
            RelayError::UploadFailed(_) => "upload",
            RelayError::SubmissionFailed(_) => "submit",
            RelayError::PollFailed(_) | RelayError::ProviderError(_) => "poll",
            RelayError::Timeout { .. } => "timeout",
        }
    }
}
