mod assemblyai_client;
mod mock_provider;

pub use assemblyai_client::{AssemblyAiClient, DEFAULT_BASE_URL};
pub use mock_provider::{MockFailure, MockTranscriptionProvider};
