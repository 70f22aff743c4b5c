//! MailSift Summarization Client
//!
//! Turns email text into a short summary while keeping outbound traffic
//! cheap and safe.
//!
//! # Architecture
//!
//! - **Cache**: fingerprint-keyed, process-lifetime, shared by clones
//! - **Rate limiter**: one outbound call per interval across all callers
//! - **Sanitizer**: markup and unsafe characters never leave the process
//! - **Heuristic**: deterministic local summary whenever the provider is
//!   unconfigured or fails
//!
//! Only blank input and a closed consent gate are reported as errors;
//! provider failures are logged and answered by the heuristic.
//!
//! # Examples
//!
//! ```no_run
//! use mailsift_domain::ConsentGate;
//! use mailsift_llm::MockSummaryService;
//! use mailsift_summarizer::SummarizationClient;
//!
//! # async fn example() -> Result<(), mailsift_summarizer::SummarizerError> {
//! let client = SummarizationClient::new(MockSummaryService::unconfigured(), ConsentGate::new(true));
//! let summary = client
//!     .summarize("Please review the attached report urgently.", None)
//!     .await?;
//! assert!(summary.contains("review"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cache;
mod client;
mod config;
mod error;
mod heuristic;
mod rate_limit;
mod sanitize;

pub use cache::{CacheStats, SummaryCache};
pub use client::{SummarizationClient, SummarizerStats, SummaryOutcome, SummarySource};
pub use config::{SummarizerConfig, SummaryOptions};
pub use error::SummarizerError;
pub use heuristic::{heuristic_summary, truncate_with_ellipsis, PLACEHOLDER_SUMMARY, URGENCY_WORDS};
pub use rate_limit::RateLimiter;
pub use sanitize::sanitize;
