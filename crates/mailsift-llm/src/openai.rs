//! OpenAI-compatible Provider Implementation
//!
//! Sends a single chat-completions request per summary. Any endpoint speaking
//! the same wire format (a proxy, a local gateway) works by overriding the
//! endpoint.
//!
//! # Examples
//!
//! ```no_run
//! use mailsift_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::builder()
//!     .api_key(std::env::var("MAILSIFT_API_KEY").ok())
//!     .build()
//!     .unwrap();
//! ```

use crate::LlmError;
use mailsift_domain::{SummaryRequest, SummaryResponse, SummaryService};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default timeout for requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder shipped in sample configs; never treated as a real key
pub const PLACEHOLDER_API_KEY: &str = "sk-your-openai-api-key-here";

/// Default summary length hint, in characters
pub const DEFAULT_MAX_LENGTH: usize = 150;

/// Default summary style hint
pub const DEFAULT_STYLE: &str = "concise";

const SYSTEM_PROMPT: &str = "You are a helpful email summarization assistant. Provide concise, \
accurate summaries focusing on key information and action items.";

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.3;

/// Whether `key` looks like a usable credential
///
/// Empty keys, the sample placeholder and keys without the `sk-` prefix are
/// all treated as missing.
pub fn is_credential_configured(key: Option<&str>) -> bool {
    match key.map(str::trim) {
        Some(key) => !key.is_empty() && key != PLACEHOLDER_API_KEY && key.starts_with("sk-"),
        None => false,
    }
}

/// Provider error message from an error response body, if it has one
///
/// OpenAI-compatible endpoints report failures as
/// `{"error": {"message": "..."}}`; anything else yields `None`.
pub fn provider_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// Build the user prompt for a summary request
pub fn build_prompt(text: &str, style: Option<&str>, max_length: Option<usize>) -> String {
    format!(
        "Please provide a {} summary of the following email content in {} characters or less. \
         Focus on the key points, action items, and important information:\n\n\
         Email Content:\n{}\n\nSummary:",
        style.unwrap_or(DEFAULT_STYLE),
        max_length.unwrap_or(DEFAULT_MAX_LENGTH),
        text
    )
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Builder for [`OpenAiProvider`]
#[derive(Debug, Clone)]
pub struct OpenAiProviderBuilder {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl Default for OpenAiProviderBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAiProviderBuilder {
    /// Override the endpoint URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the credential
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Override the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the provider
    pub fn build(self) -> Result<OpenAiProvider, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(OpenAiProvider {
            endpoint: self.endpoint,
            model: self.model,
            api_key: self.api_key,
            client,
        })
    }
}

/// OpenAI-compatible chat-completions provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Start building a provider with default endpoint and model
    pub fn builder() -> OpenAiProviderBuilder {
        OpenAiProviderBuilder::default()
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &SummaryRequest) -> Result<String, LlmError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if is_credential_configured(Some(key)) => key.trim(),
            _ => return Err(LlmError::NotConfigured),
        };

        let prompt = build_prompt(
            &request.text,
            request.style_hint.as_deref(),
            request.max_length,
        );
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(
            "Sending summary request to {} (model {}, {} chars)",
            self.endpoint,
            self.model,
            request.text.chars().count()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Summary provider returned HTTP {}", status);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::Unauthorized(format!("HTTP {}", status)));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = provider_error_message(&body).unwrap_or_else(|| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, message)));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        debug!("Summary provider replied with {} choice(s)", parsed.choices.len());

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Response has no summary text".to_string()))
    }
}

impl SummaryService for OpenAiProvider {
    type Error = LlmError;

    fn is_configured(&self) -> bool {
        is_credential_configured(self.api_key.as_deref())
    }

    fn is_unauthorized(&self, error: &LlmError) -> bool {
        error.is_unauthorized()
    }

    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, LlmError> {
        let summary_text = self.complete(&request).await?;
        Ok(SummaryResponse { summary_text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            // Read headers, then as much body as Content-Length announces.
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn provider(endpoint: String) -> OpenAiProvider {
        OpenAiProvider::builder()
            .endpoint(endpoint)
            .api_key(Some("sk-test".to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let provider = OpenAiProvider::builder().build().unwrap();
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(provider.model(), DEFAULT_MODEL);
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_credential_rules() {
        assert!(is_credential_configured(Some("sk-abc123")));
        assert!(!is_credential_configured(None));
        assert!(!is_credential_configured(Some("")));
        assert!(!is_credential_configured(Some(PLACEHOLDER_API_KEY)));
        assert!(!is_credential_configured(Some("pk-abc123")));
    }

    #[test]
    fn test_prompt_uses_hints() {
        let prompt = build_prompt("Body text", Some("detailed"), Some(300));
        assert!(prompt.starts_with("Please provide a detailed summary"));
        assert!(prompt.contains("in 300 characters or less"));
        assert!(prompt.contains("Email Content:\nBody text"));

        let defaults = build_prompt("Body text", None, None);
        assert!(defaults.contains("concise summary"));
        assert!(defaults.contains("150 characters"));
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_request() {
        // An unroutable endpoint would fail with Communication if contacted.
        let provider = OpenAiProvider::builder()
            .endpoint("http://localhost:99999")
            .build()
            .unwrap();
        let err = provider.summarize(SummaryRequest::new("hi")).await.unwrap_err();
        assert_eq!(err, LlmError::NotConfigured);
    }

    #[tokio::test]
    async fn test_transport_error() {
        let provider = provider("http://localhost:99999".to_string());
        let err = provider.summarize(SummaryRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::Communication(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let url = serve_once("401 Unauthorized", "{}").await;
        let err = provider(url).summarize(SummaryRequest::new("hi")).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_forbidden_status() {
        let url = serve_once("403 Forbidden", "{}").await;
        let err = provider(url).summarize(SummaryRequest::new("hi")).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_success_trims_content() {
        let url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"  Meeting moved to Friday.  "}}]}"#,
        )
        .await;
        let reply = provider(url).summarize(SummaryRequest::new("hi")).await.unwrap();
        assert_eq!(reply.summary_text, "Meeting moved to Friday.");
    }

    #[test]
    fn test_provider_error_message() {
        assert_eq!(
            provider_error_message(r#"{"error":{"message":" model overloaded ","type":"server_error"}}"#),
            Some("model overloaded".to_string())
        );
        assert_eq!(provider_error_message(r#"{"error":{"message":""}}"#), None);
        assert_eq!(provider_error_message("<html>Bad Gateway</html>"), None);
    }

    #[tokio::test]
    async fn test_server_error_carries_provider_message() {
        let url = serve_once(
            "500 Internal Server Error",
            r#"{"error":{"message":"model overloaded"}}"#,
        )
        .await;
        let err = provider(url).summarize(SummaryRequest::new("hi")).await.unwrap_err();
        match err {
            LlmError::Communication(message) => {
                assert!(message.contains("500"));
                assert!(message.contains("model overloaded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let url = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let err = provider(url).summarize(SummaryRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
