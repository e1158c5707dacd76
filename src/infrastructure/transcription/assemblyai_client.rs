use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use crate::application::ports::{ProviderClientError, StagedByteStream, TranscriptionProvider};
use crate::domain::{StatusSnapshot, TranscriptId, TranscriptStatus, UploadUrl};

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com/v2";
const LANGUAGE_CODE: &str = "en";

pub struct AssemblyAiClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl AssemblyAiClient {
    /// Without an `api_key` the client still works, and the provider rejects
    /// each call.
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ProviderClientError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderClientError::Request(format!("client: {}", e)))?;

        let base_url = base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderClientError::Request(format!("base url {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderClientError::Request(format!("base url {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, key),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
    auto_chapters: bool,
}

#[derive(Deserialize)]
struct TranscriptCreated {
    id: String,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl TranscriptionProvider for AssemblyAiClient {
    async fn upload(
        &self,
        audio: StagedByteStream,
        content_length: Option<u64>,
    ) -> Result<UploadUrl, ProviderClientError> {
        let url = self.endpoint(&["upload"])?;

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream");
        if let Some(len) = content_length {
            request = request.header(CONTENT_LENGTH, len);
        }

        tracing::debug!(bytes = ?content_length, "Uploading audio to provider");

        let response = self
            .authorize(request)
            .body(reqwest::Body::wrap_stream(audio))
            .send()
            .await
            .map_err(|e| ProviderClientError::Request(format!("upload: {}", e)))?;

        let result: UploadResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderClientError::Parse(format!("upload response: {}", e)))?;

        Ok(UploadUrl::new(result.upload_url))
    }

    async fn submit(&self, audio_url: &UploadUrl) -> Result<TranscriptId, ProviderClientError> {
        let url = self.endpoint(&["transcript"])?;
        let body = TranscriptRequest {
            audio_url: audio_url.as_str(),
            language_code: LANGUAGE_CODE,
            auto_chapters: false,
        };

        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderClientError::Request(format!("submit: {}", e)))?;

        let result: TranscriptCreated = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderClientError::Parse(format!("submit response: {}", e)))?;

        tracing::debug!(transcript_id = %result.id, "Provider accepted transcription job");

        Ok(TranscriptId::new(result.id))
    }

    async fn fetch_status(
        &self,
        transcript_id: &TranscriptId,
    ) -> Result<StatusSnapshot, ProviderClientError> {
        let url = self.endpoint(&["transcript", transcript_id.as_str()])?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| ProviderClientError::Request(format!("status: {}", e)))?;

        let result: TranscriptResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderClientError::Parse(format!("status response: {}", e)))?;

        let status: TranscriptStatus = result.status.parse().map_err(ProviderClientError::Parse)?;

        Ok(StatusSnapshot {
            status,
            text: result.text,
            error: result.error,
        })
    }
}

async fn ensure_success(response: Response) -> Result<Response, ProviderClientError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());

    Err(ProviderClientError::Status {
        status: status.as_u16(),
        body,
    })
}
