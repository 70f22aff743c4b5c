//! MailSift Summarization Providers
//!
//! Implementations of the `SummaryService` trait from `mailsift-domain`.
//!
//! # Providers
//!
//! - `MockSummaryService`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completions API
//!
//! Providers make exactly one attempt per request. Retrying, caching and
//! falling back to the local heuristic are the summarizer's job.
//!
//! # Examples
//!
//! ```
//! use mailsift_domain::{SummaryRequest, SummaryService};
//! use mailsift_llm::MockSummaryService;
//!
//! # tokio_test_block_on(async {
//! let service = MockSummaryService::new("Quarterly numbers are in.");
//! let reply = service.summarize(SummaryRequest::new("long email")).await.unwrap();
//! assert_eq!(reply.summary_text, "Quarterly numbers are in.");
//! assert_eq!(service.call_count(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use mailsift_domain::{SummaryRequest, SummaryResponse, SummaryService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub use openai::OpenAiProvider;

/// Errors that can occur during provider calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The provider rejected the credential (HTTP 401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// No usable credential
    #[error("Provider not configured")]
    NotConfigured,

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether this is an explicit authentication failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LlmError::Unauthorized(_))
    }

    /// Short category name for logs and metrics
    pub fn category(&self) -> &'static str {
        match self {
            LlmError::Unauthorized(_) => "unauthorized",
            LlmError::NotConfigured => "not configured",
            LlmError::InvalidResponse(_) => "invalid response",
            LlmError::Communication(_)
            | LlmError::RateLimitExceeded
            | LlmError::ModelNotAvailable(_)
            | LlmError::Other(_) => "transport",
        }
    }
}

/// Failure a [`MockSummaryService`] can be told to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Reply as if the credential were rejected
    Unauthorized,
    /// Reply as if the network failed
    Transport,
    /// Reply with an unparsable body
    InvalidResponse,
}

impl MockFailure {
    fn to_error(self) -> LlmError {
        match self {
            MockFailure::Unauthorized => LlmError::Unauthorized("HTTP 401".to_string()),
            MockFailure::Transport => LlmError::Communication("Mock transport failure".to_string()),
            MockFailure::InvalidResponse => {
                LlmError::InvalidResponse("Mock malformed body".to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(MockFailure),
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, MockReply>,
    fail_all: Option<MockFailure>,
    requests: Vec<SummaryRequest>,
    call_instants: Vec<Instant>,
}

/// Mock summarization provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls. Clones
/// share call history.
///
/// # Examples
///
/// ```
/// use mailsift_llm::{MockFailure, MockSummaryService};
///
/// let service = MockSummaryService::new("default");
/// service.add_response("hello", "world");
/// service.add_failure("bad", MockFailure::Unauthorized);
/// assert_eq!(service.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockSummaryService {
    default_response: String,
    configured: bool,
    latency: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl MockSummaryService {
    /// Create a mock that answers every request with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            configured: true,
            latency: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a mock that reports no credential
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    /// Delay every reply by `latency` (tokio time)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reply with `response` when the request text equals `text`
    pub fn add_response(&self, text: impl Into<String>, response: impl Into<String>) {
        self.state()
            .replies
            .insert(text.into(), MockReply::Text(response.into()));
    }

    /// Fail when the request text equals `text`
    pub fn add_failure(&self, text: impl Into<String>, failure: MockFailure) {
        self.state()
            .replies
            .insert(text.into(), MockReply::Fail(failure));
    }

    /// Fail every request (overrides per-text replies)
    pub fn fail_all(&self, failure: Option<MockFailure>) {
        self.state().fail_all = failure;
    }

    /// Number of summarize calls received
    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    /// When each call started, in order
    pub fn call_instants(&self) -> Vec<Instant> {
        self.state().call_instants.clone()
    }

    /// Requests received, in order
    pub fn requests(&self) -> Vec<SummaryRequest> {
        self.state().requests.clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        let mut state = self.state();
        state.requests.clear();
        state.call_instants.clear();
    }
}

impl Default for MockSummaryService {
    fn default() -> Self {
        Self::new("Default mock summary")
    }
}

impl SummaryService for MockSummaryService {
    type Error = LlmError;

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn is_unauthorized(&self, error: &LlmError) -> bool {
        error.is_unauthorized()
    }

    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, LlmError> {
        let reply = {
            let mut state = self.state();
            state.call_instants.push(Instant::now());
            let reply = match state.fail_all {
                Some(failure) => MockReply::Fail(failure),
                None => state
                    .replies
                    .get(&request.text)
                    .cloned()
                    .unwrap_or_else(|| MockReply::Text(self.default_response.clone())),
            };
            state.requests.push(request);
            reply
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            MockReply::Text(summary_text) => Ok(SummaryResponse { summary_text }),
            MockReply::Fail(failure) => Err(failure.to_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let service = MockSummaryService::new("Test summary");
        let result = service.summarize(SummaryRequest::new("anything")).await;
        assert_eq!(result.unwrap().summary_text, "Test summary");
    }

    #[tokio::test]
    async fn test_mock_specific_responses() {
        let service = MockSummaryService::default();
        service.add_response("hello", "world");

        let hit = service.summarize(SummaryRequest::new("hello")).await.unwrap();
        let miss = service.summarize(SummaryRequest::new("unknown")).await.unwrap();
        assert_eq!(hit.summary_text, "world");
        assert_eq!(miss.summary_text, "Default mock summary");
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let service = MockSummaryService::default();
        service.add_failure("bad", MockFailure::Unauthorized);

        let err = service.summarize(SummaryRequest::new("bad")).await.unwrap_err();
        assert!(err.is_unauthorized());

        service.fail_all(Some(MockFailure::Transport));
        let err = service.summarize(SummaryRequest::new("fine")).await.unwrap_err();
        assert_eq!(err.category(), "transport");
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_clone_shares_history() {
        let first = MockSummaryService::new("x");
        let second = first.clone();
        first.summarize(SummaryRequest::new("a")).await.unwrap();
        assert_eq!(second.call_count(), 1);
        second.reset_calls();
        assert_eq!(first.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_latency_and_instants() {
        let service = MockSummaryService::new("x").with_latency(Duration::from_millis(250));
        let start = Instant::now();
        service.summarize(SummaryRequest::new("a")).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(250));
        assert_eq!(service.call_instants(), vec![start]);
    }

    #[test]
    fn test_unconfigured() {
        assert!(!MockSummaryService::unconfigured().is_configured());
        assert!(MockSummaryService::default().is_configured());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(LlmError::NotConfigured.category(), "not configured");
        assert_eq!(LlmError::Unauthorized("x".into()).category(), "unauthorized");
        assert_eq!(LlmError::RateLimitExceeded.category(), "transport");
    }
}
