use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use transcribe_relay::application::services::TranscriptionRelay;
use transcribe_relay::infrastructure::observability::{TracingConfig, init_tracing, mask_secret};
use transcribe_relay::infrastructure::storage::StagingStoreFactory;
use transcribe_relay::infrastructure::transcription::AssemblyAiClient;
use transcribe_relay::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(&TracingConfig {
        environment: environment.to_string(),
        default_level: settings.logging.level.clone(),
        json_format: settings.logging.enable_json,
    });

    if settings.provider.api_key.is_none() {
        tracing::warn!("API_KEY not set, provider calls will be rejected until it is configured");
    }

    tracing::info!(
        base_url = %settings.provider.base_url,
        credential = %mask_secret(settings.provider.api_key.as_deref()),
        "Transcription provider configured"
    );

    let staging_store = StagingStoreFactory::create(&settings.storage)?;

    let provider = Arc::new(AssemblyAiClient::new(
        settings.provider.api_key.clone(),
        Some(settings.provider.base_url.clone()),
        Duration::from_secs(settings.provider.request_timeout_secs),
    )?);

    let relay = Arc::new(TranscriptionRelay::new(
        provider,
        staging_store,
        settings.polling.policy(),
    ));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState { relay, settings };
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
