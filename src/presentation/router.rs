use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::TranscriptionProvider;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{health_handler, transcribe_handler};
use crate::presentation::state::AppState;

pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: TranscriptionProvider + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.settings.storage.max_upload_size_bytes);

    Router::new()
        .route("/health", get(health_handler))
        .route("/transcribe", post(transcribe_handler::<P>))
        .route("/api/v1/transcribe", post(transcribe_handler::<P>))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
