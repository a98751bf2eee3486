use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiErrorBody,
    protocol::{
        ChatRequest, ChatResponse, ChunksResponse, DocumentInfo, DocumentsResponse, ServiceStatus,
    },
};
use tracing::{debug, warn};

pub mod citation;
pub mod controller;
pub mod error;
pub mod history;
pub mod registry;
pub mod transcript;
pub mod upload;

pub use controller::{
    ChatSession, PendingTurn, SessionEvent, SubmitOutcome, SubmitRejected, TurnController,
    TurnState,
};
pub use error::{ClientError, UploadError};
pub use registry::DocumentRegistry;
pub use transcript::{Transcript, Turn, TurnKind, CHAT_ERROR_MESSAGE};
pub use upload::PdfFile;

const CHAT_PATH: &str = "/api/chat";
const UPLOAD_PATH: &str = "/api/upload";
const DOCUMENTS_PATH: &str = "/api/documents";
const CHUNKS_PATH: &str = "/api/chunks";
const STATUS_PATH: &str = "/";

/// Answers one question given the prior conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}

/// HTTP client for the document Q&A backend.
#[derive(Debug, Clone)]
pub struct QaClient {
    http: Client,
    base_url: Option<String>,
}

impl QaClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Like [`QaClient::new`] but every request fails once `timeout` elapses.
    pub fn with_timeout(base_url: Option<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<String, ClientError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(ClientError::MissingBaseUrl)?;
        Ok(format!("{base_url}{path}"))
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let res = self
            .http
            .post(self.endpoint(CHAT_PATH)?)
            .json(request)
            .send()
            .await?;
        decode_json(res).await
    }

    /// Lists ingested documents. Without a configured base URL this targets the
    /// bare relative path, which only resolves when served from the backend origin.
    pub async fn list_documents(&self) -> Result<Vec<DocumentInfo>, ClientError> {
        let base_url = self.base_url.as_deref().unwrap_or_default();
        let res = self
            .http
            .get(format!("{base_url}{DOCUMENTS_PATH}"))
            .send()
            .await?;
        let body: DocumentsResponse = decode_json(res).await?;
        debug!(count = body.documents.len(), "document registry fetched");
        Ok(body.documents)
    }

    pub async fn list_chunks(&self) -> Result<ChunksResponse, ClientError> {
        let res = self.http.get(self.endpoint(CHUNKS_PATH)?).send().await?;
        decode_json(res).await
    }

    pub async fn status(&self) -> Result<ServiceStatus, ClientError> {
        let res = self.http.get(self.endpoint(STATUS_PATH)?).send().await?;
        decode_json(res).await
    }
}

#[async_trait]
impl ChatBackend for QaClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        QaClient::chat(self, request).await
    }
}

async fn ensure_success(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    match ApiErrorBody::parse(&body) {
        Some(detail) => warn!(
            status = status.as_u16(),
            detail = %detail.message(),
            "backend rejected request"
        ),
        None => warn!(status = status.as_u16(), "backend rejected request"),
    }
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let res = ensure_success(res).await?;
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
