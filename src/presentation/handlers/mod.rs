mod health;
mod transcribe;

pub use health::health_handler;
pub use transcribe::{ErrorResponse, TranscriptResponse, relay_error_status, transcribe_handler};
