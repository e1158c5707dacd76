mod provider_refs;
mod status_snapshot;
mod storage_path;
mod transcript_status;
mod upload_id;

pub use provider_refs::{TranscriptId, UploadUrl};
pub use status_snapshot::StatusSnapshot;
pub use storage_path::StoragePath;
pub use transcript_status::TranscriptStatus;
pub use upload_id::UploadId;
