use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;

use crate::application::ports::{ProviderClientError, StagedByteStream, TranscriptionProvider};
use crate::domain::{StatusSnapshot, TranscriptId, UploadUrl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Upload,
    Submit,
    Poll,
}

/// Scripted provider. Status snapshots are handed out in order and the last
/// one repeats once the script runs out.
pub struct MockTranscriptionProvider {
    statuses: Mutex<VecDeque<StatusSnapshot>>,
    failure: Option<MockFailure>,
    uploads: AtomicUsize,
    uploaded_bytes: AtomicUsize,
    submissions: AtomicUsize,
    polls: AtomicUsize,
}

impl MockTranscriptionProvider {
    pub fn new(statuses: Vec<StatusSnapshot>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            failure: None,
            uploads: AtomicUsize::new(0),
            uploaded_bytes: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn completed(text: &str) -> Self {
        Self::new(vec![StatusSnapshot::completed(text)])
    }

    pub fn failing_at(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn injected(&self, phase: MockFailure) -> Result<(), ProviderClientError> {
        if self.failure == Some(phase) {
            return Err(ProviderClientError::Status {
                status: 500,
                body: format!("injected {:?} failure", phase),
            });
        }
        Ok(())
    }

    fn next_status(&self) -> StatusSnapshot {
        let mut statuses = self
            .statuses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match statuses.len() {
            0 => StatusSnapshot::processing(),
            1 => statuses[0].clone(),
            _ => statuses.pop_front().unwrap_or_else(StatusSnapshot::processing),
        }
    }
}

#[async_trait]
impl TranscriptionProvider for MockTranscriptionProvider {
    async fn upload(
        &self,
        mut audio: StagedByteStream,
        _content_length: Option<u64>,
    ) -> Result<UploadUrl, ProviderClientError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.injected(MockFailure::Upload)?;

        let mut total = 0;
        while let Some(chunk) = audio.next().await {
            let chunk = chunk.map_err(|e| ProviderClientError::Request(e.to_string()))?;
            total += chunk.len();
        }
        self.uploaded_bytes.fetch_add(total, Ordering::SeqCst);

        Ok(UploadUrl::new(format!(
            "https://mock.invalid/upload/{}",
            self.uploads()
        )))
    }

    async fn submit(&self, _audio_url: &UploadUrl) -> Result<TranscriptId, ProviderClientError> {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        self.injected(MockFailure::Submit)?;
        Ok(TranscriptId::new(format!("mock-transcript-{}", n)))
    }

    async fn fetch_status(
        &self,
        _transcript_id: &TranscriptId,
    ) -> Result<StatusSnapshot, ProviderClientError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.injected(MockFailure::Poll)?;
        Ok(self.next_status())
    }
}
