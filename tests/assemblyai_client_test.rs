use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use futures::{StreamExt, stream};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use transcribe_relay::application::ports::{
    ProviderClientError, StagedByteStream, TranscriptionProvider,
};
use transcribe_relay::domain::{TranscriptId, TranscriptStatus, UploadUrl};
use transcribe_relay::infrastructure::transcription::AssemblyAiClient;

const TEST_KEY: &str = "test-credential-0123456789";

#[derive(Default)]
struct Captured {
    upload_body: Vec<u8>,
    upload_auth: Option<String>,
    submit_body: Option<Value>,
    submit_auth: Option<String>,
    status_auth: Option<String>,
    status_id: Option<String>,
}

#[derive(Clone)]
struct MockProviderState {
    captured: Arc<Mutex<Captured>>,
    status_code: u16,
    status_body: &'static str,
}

fn auth_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn upload_route(
    State(state): State<MockProviderState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let mut captured = state.captured.lock().unwrap();
    captured.upload_body = body.to_vec();
    captured.upload_auth = auth_of(&headers);
    Json(json!({ "upload_url": "https://cdn.mock/upload/abc" }))
}

async fn submit_route(
    State(state): State<MockProviderState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut captured = state.captured.lock().unwrap();
    captured.submit_body = Some(body);
    captured.submit_auth = auth_of(&headers);
    Json(json!({ "id": "tr_123", "status": "queued" }))
}

async fn status_route(
    State(state): State<MockProviderState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    {
        let mut captured = state.captured.lock().unwrap();
        captured.status_auth = auth_of(&headers);
        captured.status_id = Some(id);
    }
    let status = StatusCode::from_u16(state.status_code).unwrap();
    (status, state.status_body).into_response()
}

async fn start_mock_provider(
    status_code: u16,
    status_body: &'static str,
) -> (String, Arc<Mutex<Captured>>, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let captured = Arc::new(Mutex::new(Captured::default()));

    let state = MockProviderState {
        captured: Arc::clone(&captured),
        status_code,
        status_body,
    };

    let app = Router::new()
        .route("/v2/upload", post(upload_route))
        .route("/v2/transcript", post(submit_route))
        .route("/v2/transcript/{id}", get(status_route))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/v2/", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, captured, shutdown_tx)
}

async fn start_rejecting_provider() -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().fallback(|| async {
        (
            StatusCode::UNAUTHORIZED,
            r#"{"error": "Authentication error, API token missing/invalid"}"#,
        )
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (format!("http://{}", addr), shutdown_tx)
}

fn client(base_url: &str, api_key: Option<&str>) -> AssemblyAiClient {
    AssemblyAiClient::new(
        api_key.map(String::from),
        Some(base_url.to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn audio_stream(chunks: &[&'static [u8]]) -> StagedByteStream {
    let items: Vec<Result<Bytes, std::io::Error>> = chunks
        .iter()
        .map(|c| Ok(Bytes::from_static(*c)))
        .collect();
    stream::iter(items).boxed()
}

#[tokio::test]
async fn given_audio_stream_when_uploading_then_body_and_credential_reach_provider() {
    let (base_url, captured, shutdown_tx) = start_mock_provider(200, "{}").await;
    let provider = client(&base_url, Some(TEST_KEY));

    let result = provider
        .upload(audio_stream(&[b"RIFF", b"fake-wave"]), Some(13))
        .await;

    assert_eq!(result.unwrap().as_str(), "https://cdn.mock/upload/abc");
    let captured = captured.lock().unwrap();
    assert_eq!(captured.upload_body, b"RIFFfake-wave");
    assert_eq!(captured.upload_auth.as_deref(), Some(TEST_KEY));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_upload_url_when_submitting_then_sends_fixed_language_and_no_chapters() {
    let (base_url, captured, shutdown_tx) = start_mock_provider(200, "{}").await;
    let provider = client(&base_url, Some(TEST_KEY));

    let result = provider
        .submit(&UploadUrl::new("https://cdn.mock/upload/abc"))
        .await;

    assert_eq!(result.unwrap(), TranscriptId::new("tr_123"));
    let captured = captured.lock().unwrap();
    assert_eq!(
        captured.submit_body,
        Some(json!({
            "audio_url": "https://cdn.mock/upload/abc",
            "language_code": "en",
            "auto_chapters": false
        }))
    );
    assert_eq!(captured.submit_auth.as_deref(), Some(TEST_KEY));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_completed_job_when_fetching_status_then_returns_transcript_text() {
    let body = r#"{"id": "tr_123", "status": "completed", "text": "hello world"}"#;
    let (base_url, captured, shutdown_tx) = start_mock_provider(200, body).await;
    let provider = client(&base_url, Some(TEST_KEY));

    let snapshot = provider
        .fetch_status(&TranscriptId::new("tr_123"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, TranscriptStatus::Completed);
    assert_eq!(snapshot.text.as_deref(), Some("hello world"));
    assert!(snapshot.error.is_none());
    let captured = captured.lock().unwrap();
    assert_eq!(captured.status_id.as_deref(), Some("tr_123"));
    assert_eq!(captured.status_auth.as_deref(), Some(TEST_KEY));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_errored_job_when_fetching_status_then_returns_provider_message() {
    let body = r#"{"id": "tr_123", "status": "error", "text": null, "error": "bad audio"}"#;
    let (base_url, _captured, shutdown_tx) = start_mock_provider(200, body).await;
    let provider = client(&base_url, Some(TEST_KEY));

    let snapshot = provider
        .fetch_status(&TranscriptId::new("tr_123"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, TranscriptStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some("bad audio"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_processing_job_when_fetching_status_then_text_is_absent() {
    let body = r#"{"id": "tr_123", "status": "processing"}"#;
    let (base_url, _captured, shutdown_tx) = start_mock_provider(200, body).await;
    let provider = client(&base_url, Some(TEST_KEY));

    let snapshot = provider
        .fetch_status(&TranscriptId::new("tr_123"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, TranscriptStatus::Processing);
    assert!(snapshot.text.is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unknown_status_value_when_fetching_status_then_returns_parse_error() {
    let body = r#"{"id": "tr_123", "status": "paused"}"#;
    let (base_url, _captured, shutdown_tx) = start_mock_provider(200, body).await;
    let provider = client(&base_url, Some(TEST_KEY));

    let result = provider.fetch_status(&TranscriptId::new("tr_123")).await;

    assert!(matches!(result, Err(ProviderClientError::Parse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_status_endpoint_returns_not_found_when_fetching_then_returns_status_error() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_provider(404, r#"{"error": "Transcript not found"}"#).await;
    let provider = client(&base_url, Some(TEST_KEY));

    let result = provider.fetch_status(&TranscriptId::new("missing")).await;

    match result {
        Err(ProviderClientError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("Transcript not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_provider_rejects_credential_when_uploading_then_returns_status_error() {
    let (base_url, shutdown_tx) = start_rejecting_provider().await;
    let provider = client(&base_url, Some("wrong-key"));

    let result = provider.upload(audio_stream(&[b"audio"]), Some(5)).await;

    assert!(matches!(
        result,
        Err(ProviderClientError::Status { status: 401, .. })
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_no_credential_when_uploading_then_authorization_header_is_omitted() {
    let (base_url, captured, shutdown_tx) = start_mock_provider(200, "{}").await;
    let provider = client(&base_url, None);

    provider
        .upload(audio_stream(&[b"audio"]), None)
        .await
        .unwrap();

    assert!(captured.lock().unwrap().upload_auth.is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_provider_when_submitting_then_returns_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let provider = client(&format!("http://{}", addr), Some(TEST_KEY));

    let result = provider.submit(&UploadUrl::new("https://cdn.mock/x")).await;

    assert!(matches!(result, Err(ProviderClientError::Request(_))));
}

#[tokio::test]
async fn given_transcript_id_with_reserved_characters_when_fetching_then_id_stays_one_path_segment() {
    let body = r#"{"id": "tr/1?x#y", "status": "queued"}"#;
    let (base_url, captured, shutdown_tx) = start_mock_provider(200, body).await;
    let provider = client(&base_url, Some(TEST_KEY));

    let snapshot = provider
        .fetch_status(&TranscriptId::new("tr/1?x#y"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, TranscriptStatus::Queued);
    assert_eq!(captured.lock().unwrap().status_id.as_deref(), Some("tr/1?x#y"));
    shutdown_tx.send(()).ok();
}

#[test]
fn given_malformed_base_url_when_building_client_then_returns_request_error() {
    let result = AssemblyAiClient::new(None, Some("not a url".to_string()), Duration::from_secs(5));

    assert!(matches!(result, Err(ProviderClientError::Request(_))));
}
