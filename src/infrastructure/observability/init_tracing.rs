use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use super::TracingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},transcribe_relay={level},tower_http=debug",
            level = config.default_level
        ))
    });

    let json_layer = config.json_format.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });
    let text_layer = (!config.json_format).then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!(
        environment = %config.environment,
        json_format = config.json_format,
        "Tracing initialized"
    );
}
