use std::fmt;
use std::str::FromStr;

/// Job state as reported by the transcription provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl TranscriptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptStatus::Queued => "queued",
            TranscriptStatus::Processing => "processing",
            TranscriptStatus::Completed => "completed",
            TranscriptStatus::Error => "error",
        }
    }
}

impl FromStr for TranscriptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(TranscriptStatus::Queued),
            "processing" => Ok(TranscriptStatus::Processing),
            "completed" => Ok(TranscriptStatus::Completed),
            "error" => Ok(TranscriptStatus::Error),
            _ => Err(format!("Invalid transcript status: {}", s)),
        }
    }
}

impl fmt::Display for TranscriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
