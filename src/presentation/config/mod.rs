mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    API_KEY_VAR, LoggingSettings, PollingSettings, ProviderSettings, ServerSettings, Settings,
    StorageProviderSetting, StorageSettings, resolve_api_key,
};
