use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::TranscriptionProvider;
use crate::application::services::RelayError;
use crate::presentation::state::AppState;

const UPLOAD_FIELD: &str = "file";
const UNNAMED_UPLOAD: &str = "upload.bin";

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub text: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler<P>(
    State(state): State<AppState<P>>,
    mut multipart: Multipart,
) -> Response
where
    P: TranscriptionProvider + 'static,
{
    let (filename, data) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Transcribe request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded".to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(e.status(), format!("Failed to read multipart: {}", e));
            }
        };

        if field.name() != Some(UPLOAD_FIELD) && field.file_name().is_none() {
            continue;
        }

        let filename = field.file_name().unwrap_or(UNNAMED_UPLOAD).to_string();
        match field.bytes().await {
            Ok(d) => break (filename, d),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read file bytes");
                return error_response(e.status(), format!("Failed to read file: {}", e));
            }
        }
    };

    if data.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Uploaded file is empty".to_string());
    }

    tracing::debug!(filename = %filename, bytes = data.len(), "Audio upload received");

    match state.relay.transcribe(data, &filename).await {
        Ok(text) => (StatusCode::OK, Json(TranscriptResponse { text })).into_response(),
        Err(e) => {
            tracing::error!(phase = e.phase(), error = %e, "Transcription failed");
            error_response(relay_error_status(&e), e.to_string())
        }
    }
}

/// Timeouts map to 504 so the caller knows a retry may succeed.
pub fn relay_error_status(error: &RelayError) -> StatusCode {
    match error {
        RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorResponse { detail })).into_response()
}
