/// The single point of entry for all completion API calls.
///
/// Speaks the OpenAI chat-completions protocol. The model and sampling settings are
/// fixed constants; callers only choose the messages.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// The model used for every assessment.
pub const MODEL: &str = "gpt-4o-mini";
pub const TEMPERATURE: f32 = 0.1;
pub const TOP_P: f32 = 0.8;
pub const MAX_TOKENS: u32 = 2000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A complete chat-completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl ChatRequest {
    /// Builds a request with one system turn and one user turn using the fixed
    /// model and sampling configuration.
    pub fn new(system: String, user: String) -> Self {
        Self {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: system,
                },
                ChatMessage {
                    role: Role::User,
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.message(Role::System)
    }

    pub fn user_prompt(&self) -> Option<&str> {
        self.message(Role::User)
    }

    fn message(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anything that can turn a chat request into generated text.
/// `AppState` carries it as `Arc<dyn ChatCompletion>`.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// HTTP client for the completion API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self, LlmError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            base_url,
        })
    }

    /// Cheap authenticated call used to check that the API key is accepted.
    pub async fn list_models(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    /// Makes a single call to the chat-completions endpoint. No retries.
    pub async fn call(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let chat_response: ChatResponse = check_status(response).await?.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message: api_error_message(body),
    })
}

/// Pulls `error.message` out of an API error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    #[test]
    fn test_request_uses_fixed_sampling() {
        let request = ChatRequest::new("sys".to_string(), "usr".to_string());
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 2000);
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!((body["top_p"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn test_prompt_accessors() {
        let request = ChatRequest::new("sys".to_string(), "usr".to_string());
        assert_eq!(request.system_prompt(), Some("sys"));
        assert_eq!(request.user_prompt(), Some("usr"));
    }

    #[test]
    fn test_response_text_reads_first_choice() {
        let raw = r##"{
            "choices": [{"message": {"role": "assistant", "content": "# Ana Horvat"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"##;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.text(), Some("# Ana Horvat"));
    }

    #[test]
    fn test_response_without_content_has_no_text() {
        let raw = r#"{"choices": [{"message": {"content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_api_error_message_parsed() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            api_error_message(body.to_string()),
            "Incorrect API key provided"
        );
    }

    #[test]
    fn test_api_error_message_falls_back_to_body() {
        assert_eq!(api_error_message("Bad Gateway".to_string()), "Bad Gateway");
    }

    async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    /// Accepts only `sk-good` and answers with the model and user turn it received.
    fn fake_api(content_present: bool) -> Router {
        Router::new()
            .route(
                "/v1/models",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok());
                    if auth == Some("Bearer sk-good") {
                        (StatusCode::OK, Json(json!({"object": "list", "data": []})))
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": {"message": "Incorrect API key provided"}})),
                        )
                    }
                }),
            )
            .route(
                "/v1/chat/completions",
                post(move |Json(body): Json<Value>| async move {
                    let content = content_present.then(|| {
                        format!(
                            "{}|{}",
                            body["model"].as_str().unwrap_or_default(),
                            body["messages"][1]["content"].as_str().unwrap_or_default()
                        )
                    });
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": content}}],
                        "usage": {"prompt_tokens": 12, "completion_tokens": 3}
                    }))
                }),
            )
    }

    #[tokio::test]
    async fn test_list_models_accepts_valid_key() {
        let base = spawn_api(fake_api(true)).await;
        let client = LlmClient::new("sk-good".to_string(), base).unwrap();
        assert!(client.list_models().await.is_ok());
    }

    #[tokio::test]
    async fn test_list_models_rejection_is_api_error() {
        let base = spawn_api(fake_api(true)).await;
        let client = LlmClient::new("sk-wrong".to_string(), base).unwrap();

        match client.list_models().await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_returns_generated_text() {
        let base = spawn_api(fake_api(true)).await;
        let client = LlmClient::new("sk-good".to_string(), base).unwrap();
        let request = ChatRequest::new("sys".to_string(), "usr".to_string());

        let text = client.complete(&request).await.unwrap();

        assert_eq!(text, "gpt-4o-mini|usr");
    }

    #[tokio::test]
    async fn test_complete_without_content_is_empty_content_error() {
        let base = spawn_api(fake_api(false)).await;
        let client = LlmClient::new("sk-good".to_string(), base).unwrap();
        let request = ChatRequest::new("sys".to_string(), "usr".to_string());

        let result = client.complete(&request).await;

        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = LlmClient::new("sk-test".to_string(), "http://localhost:9/v1/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9/v1");
    }
}
