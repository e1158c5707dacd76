mod staged_upload;
mod transcription_relay;

pub use staged_upload::StagedUpload;
pub use transcription_relay::{PollingPolicy, RelayError, TranscriptionRelay};
