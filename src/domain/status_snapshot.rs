use super::TranscriptStatus;

/// One poll result. Superseded by the next poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: TranscriptStatus,
    pub text: Option<String>,
    pub error: Option<String>,
}

impl StatusSnapshot {
    pub fn queued() -> Self {
        Self::pending(TranscriptStatus::Queued)
    }

    pub fn processing() -> Self {
        Self::pending(TranscriptStatus::Processing)
    }

    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            status: TranscriptStatus::Completed,
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: TranscriptStatus::Error,
            text: None,
            error: Some(message.into()),
        }
    }

    fn pending(status: TranscriptStatus) -> Self {
        Self {
            status,
            text: None,
            error: None,
        }
    }
}
