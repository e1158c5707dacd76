use std::sync::Arc;

use crate::application::ports::TranscriptionProvider;
use crate::application::services::TranscriptionRelay;
use crate::presentation::config::Settings;

pub struct AppState<P>
where
    P: TranscriptionProvider,
{
    pub relay: Arc<TranscriptionRelay<P>>,
    pub settings: Settings,
}

impl<P> Clone for AppState<P>
where
    P: TranscriptionProvider,
{
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
            settings: self.settings.clone(),
        }
    }
}
