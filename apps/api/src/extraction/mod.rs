//! Client for the document extraction service: one upload in, structured data plus
//! Markdown and plain text out.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

const EXTRACT_ENDPOINT: &str = "/extract";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction service returned {status}: {message}")]
    Service { status: u16, message: String },
}

/// The three renderings of one extracted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(default = "empty_object")]
    pub data: Value,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub text: String,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError>;
}

/// Production extractor backed by the HTTP extraction service.
pub struct HttpDocumentExtractor {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpDocumentExtractor {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl DocumentExtractor for HttpDocumentExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let file_content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new().part("file", Part::bytes(file_content).file_name(file_name));
        let url = format!("{}{}", self.base_url, EXTRACT_ENDPOINT);

        info!("Calling extraction service: {}", url);

        let mut request = self.client.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Service {
                status: status.as_u16(),
                message: service_error_message(body),
            });
        }

        Ok(response.json::<ExtractedDocument>().await?)
    }
}

/// Prefers an `error` or `message` field from a JSON error body.
fn service_error_message(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["error", "message", "detail"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or(body)
}
