use std::fmt;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::PollingPolicy;
use crate::infrastructure::observability::mask_secret;
use crate::infrastructure::transcription::DEFAULT_BASE_URL;

use super::Environment;

/// Legacy variable holding the provider credential.
pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub polling: PollingSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(self.api_key.as_deref()))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub interval_ms: u64,
    pub max_wait_secs: u64,
}

impl PollingSettings {
    pub fn policy(&self) -> PollingPolicy {
        PollingPolicy {
            interval: Duration::from_millis(self.interval_ms),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub max_upload_size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.<env>` (optional) and `APP_*`
    /// variables (`APP_SERVER__PORT=9000`), then falls back to `API_KEY` for
    /// the credential.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let configuration = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("provider.base_url", DEFAULT_BASE_URL)?
            .set_default("provider.request_timeout_secs", 60)?
            .set_default("polling.interval_ms", 500)?
            .set_default("polling.max_wait_secs", 30)?
            .set_default("storage.provider", "local")?
            .set_default("storage.local_path", "temp_audio")?
            .set_default("storage.max_upload_size_bytes", 100 * 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;
        settings.provider.api_key = resolve_api_key(
            settings.provider.api_key.take(),
            std::env::var(API_KEY_VAR).ok(),
        );

        Ok(settings)
    }
}

/// Picks the provider credential: a configured `provider.api_key` wins over
/// the legacy variable, and blank values count as missing.
pub fn resolve_api_key(configured: Option<String>, legacy: Option<String>) -> Option<String> {
    let present = |key: &String| !key.trim().is_empty();
    configured.filter(present).or_else(|| legacy.filter(present))
}
