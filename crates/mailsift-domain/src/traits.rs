//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Document trees are covered by [`crate::tree`]; this module holds the
//! summarization provider seam.

use std::fmt::Display;
use std::future::Future;

/// Request sent to a summarization provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Sanitized text to summarize
    pub text: String,

    /// Style hint, e.g. "concise"
    pub style_hint: Option<String>,

    /// Target maximum summary length in characters
    pub max_length: Option<usize>,
}

impl SummaryRequest {
    /// Request with no hints
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_hint: None,
            max_length: None,
        }
    }

    /// Set the style hint
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style_hint = Some(style.into());
        self
    }

    /// Set the target length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// Provider reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    /// Summary text as returned by the provider
    pub summary_text: String,
}

/// Remote summarization provider
///
/// Implemented by the infrastructure layer (mailsift-llm)
pub trait SummaryService {
    /// Error type for provider operations
    type Error: Display + Send;

    /// Whether usable credentials are present
    ///
    /// When this is `false` callers skip the provider entirely.
    fn is_configured(&self) -> bool;

    /// Whether an error is an explicit authentication failure
    ///
    /// Everything else is treated as a transport failure.
    fn is_unauthorized(&self, _error: &Self::Error) -> bool {
        false
    }

    /// Request one summary. Implementations make a single attempt.
    fn summarize(
        &self,
        request: SummaryRequest,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>> + Send;
}
