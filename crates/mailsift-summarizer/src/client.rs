//! Summarization Client
//!
//! Front door for every summary request. Pipeline per call:
//!
//! 1. Consent and blank-input checks
//! 2. Fingerprint the raw text; a cache hit returns immediately
//! 3. Sanitize the text
//! 4. Without a credential, summarize locally
//! 5. Otherwise wait on the shared rate limiter and make one provider call
//! 6. Any provider failure degrades to the local heuristic
//! 7. Whatever was produced is cached under the fingerprint
//!
//! Concurrent requests for the same fingerprint are coalesced: the second
//! caller waits for the first and then reads the cache.

use crate::cache::SummaryCache;
use crate::config::{SummarizerConfig, SummaryOptions};
use crate::error::SummarizerError;
use crate::heuristic::heuristic_summary;
use crate::rate_limit::RateLimiter;
use crate::sanitize::sanitize;
use mailsift_domain::{ConsentGate, Fingerprint, SummaryRequest, SummaryService};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Where a summary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    /// Served from the cache
    Cached,
    /// Produced by the remote provider
    Remote,
    /// Produced by the local heuristic
    Heuristic,
}

impl SummarySource {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarySource::Cached => "cached",
            SummarySource::Remote => "remote",
            SummarySource::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for SummarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A summary and its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    /// Summary text
    pub text: String,

    /// Origin of the text
    pub source: SummarySource,
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummarizerStats {
    /// Accepted requests (consent granted, non-blank)
    pub requests: u64,

    /// Requests answered from the cache
    pub cache_hits: u64,

    /// Provider calls attempted
    pub remote_calls: u64,

    /// Summaries produced by the heuristic
    pub fallbacks: u64,

    /// Provider calls rejected as unauthorized
    pub unauthorized_failures: u64,

    /// Provider calls that failed in transport or parsing
    pub transport_failures: u64,
}

type InflightMap = HashMap<Fingerprint, Arc<tokio::sync::Mutex<()>>>;

/// Removes a coalescing slot when its call finishes or is dropped
struct InflightEntry<'a> {
    map: &'a Mutex<InflightMap>,
    key: Fingerprint,
}

impl Drop for InflightEntry<'_> {
    fn drop(&mut self) {
        self.map
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

/// Summarization Client
pub struct SummarizationClient<S> {
    service: Arc<S>,
    cache: SummaryCache,
    limiter: RateLimiter,
    consent: ConsentGate,
    config: SummarizerConfig,
    stats: Arc<Mutex<SummarizerStats>>,
    inflight: Arc<Mutex<InflightMap>>,
}

impl<S> Clone for SummarizationClient<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache: self.cache.clone(),
            limiter: self.limiter.clone(),
            consent: self.consent.clone(),
            config: self.config.clone(),
            stats: Arc::clone(&self.stats),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<S: SummaryService + Send + Sync> SummarizationClient<S> {
    /// Client with default configuration and a fresh cache and limiter
    pub fn new(service: S, consent: ConsentGate) -> Self {
        let config = SummarizerConfig::default();
        Self {
            service: Arc::new(service),
            cache: SummaryCache::new(),
            limiter: RateLimiter::new(config.min_interval()),
            consent,
            config,
            stats: Arc::new(Mutex::new(SummarizerStats::default())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Client with a validated configuration
    pub fn with_config(
        service: S,
        consent: ConsentGate,
        config: SummarizerConfig,
    ) -> Result<Self, SummarizerError> {
        config.validate().map_err(SummarizerError::Config)?;
        let mut client = Self::new(service, consent);
        client.limiter = RateLimiter::new(config.min_interval());
        client.config = config;
        Ok(client)
    }

    /// Use a shared cache instead of a private one
    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = cache;
        self
    }

    /// Use a shared rate limiter instead of a private one
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// The wrapped provider
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The summary cache
    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// The rate limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The consent gate
    pub fn consent(&self) -> &ConsentGate {
        &self.consent
    }

    /// Current configuration
    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> SummarizerStats {
        *self.lock_stats()
    }

    fn lock_stats(&self) -> MutexGuard<'_, SummarizerStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_inflight(&self) -> MutexGuard<'_, InflightMap> {
        self.inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fingerprints with a call in progress
    pub fn inflight_len(&self) -> usize {
        self.lock_inflight().len()
    }

    /// Summarize `text`, returning only the summary
    pub async fn summarize(
        &self,
        text: &str,
        options: Option<SummaryOptions>,
    ) -> Result<String, SummarizerError> {
        self.summarize_detailed(text, options).await.map(|outcome| outcome.text)
    }

    /// Summarize `text`, reporting where the summary came from
    pub async fn summarize_detailed(
        &self,
        text: &str,
        options: Option<SummaryOptions>,
    ) -> Result<SummaryOutcome, SummarizerError> {
        if !self.consent.is_granted() {
            return Err(SummarizerError::ConsentRequired);
        }
        if text.trim().is_empty() {
            return Err(SummarizerError::EmptyInput);
        }
        self.lock_stats().requests += 1;

        let key = Fingerprint::of(text);
        if let Some(text) = self.cached(&key) {
            return Ok(SummaryOutcome {
                text,
                source: SummarySource::Cached,
            });
        }

        let slot = Arc::clone(self.lock_inflight().entry(key).or_default());
        let _entry = InflightEntry {
            map: &self.inflight,
            key,
        };
        let _turn = slot.lock().await;

        // Another caller may have finished while we waited.
        if let Some(text) = self.cached(&key) {
            return Ok(SummaryOutcome {
                text,
                source: SummarySource::Cached,
            });
        }

        let options = options.unwrap_or_else(|| self.config.default_options.clone());
        let outcome = self.produce(text, options).await;
        self.cache.insert(key, outcome.text.clone());
        Ok(outcome)
    }

    fn cached(&self, key: &Fingerprint) -> Option<String> {
        let hit = self.cache.get(key)?;
        self.lock_stats().cache_hits += 1;
        debug!("Summary cache hit for {}", key);
        Some(hit)
    }

    async fn produce(&self, text: &str, options: SummaryOptions) -> SummaryOutcome {
        let sanitized = sanitize(text, self.config.max_input_chars);

        if !self.service.is_configured() {
            warn!("Summarization provider unavailable (not configured), using local heuristic");
            return self.fallback(&sanitized);
        }

        let waited = self.limiter.acquire().await;
        if !waited.is_zero() {
            debug!("Rate limiter delayed summarization by {:?}", waited);
        }
        self.lock_stats().remote_calls += 1;

        let request = SummaryRequest::new(sanitized.clone())
            .with_style(options.style)
            .with_max_length(options.max_length);

        match self.service.summarize(request).await {
            Ok(response) => {
                let summary = response.summary_text.trim();
                if summary.is_empty() {
                    self.lock_stats().transport_failures += 1;
                    warn!("Summarization provider failed (invalid response: empty summary), using local heuristic");
                    return self.fallback(&sanitized);
                }
                SummaryOutcome {
                    text: summary.to_string(),
                    source: SummarySource::Remote,
                }
            }
            Err(e) => {
                let category = if self.service.is_unauthorized(&e) {
                    self.lock_stats().unauthorized_failures += 1;
                    "unauthorized"
                } else {
                    self.lock_stats().transport_failures += 1;
                    "transport"
                };
                warn!("Summarization provider failed ({}: {}), using local heuristic", category, e);
                self.fallback(&sanitized)
            }
        }
    }

    fn fallback(&self, sanitized: &str) -> SummaryOutcome {
        self.lock_stats().fallbacks += 1;
        SummaryOutcome {
            text: heuristic_summary(sanitized, self.config.fallback_max_chars),
            source: SummarySource::Heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsift_llm::{MockFailure, MockSummaryService};
    use std::time::Duration;

    fn client(service: MockSummaryService) -> SummarizationClient<MockSummaryService> {
        SummarizationClient::new(service, ConsentGate::new(true))
    }

    #[tokio::test]
    async fn test_remote_summary_is_trimmed_and_cached() {
        let service = MockSummaryService::new("  Numbers are in.  ");
        let client = client(service.clone());

        let outcome = client.summarize_detailed("Quarterly report", None).await.unwrap();
        assert_eq!(outcome.text, "Numbers are in.");
        assert_eq!(outcome.source, SummarySource::Remote);
        assert_eq!(client.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_options() {
        let service = MockSummaryService::new("ok");
        let client = client(service.clone());
        let options = SummaryOptions {
            max_length: 80,
            style: "bullet".to_string(),
        };
        client.summarize("<b>Hello</b> there", Some(options)).await.unwrap();

        let request = &service.requests()[0];
        assert_eq!(request.text, "Hello there");
        assert_eq!(request.style_hint.as_deref(), Some("bullet"));
        assert_eq!(request.max_length, Some(80));
    }

    #[tokio::test]
    async fn test_default_options_used() {
        let service = MockSummaryService::new("ok");
        let client = client(service.clone());
        client.summarize("Hello there", None).await.unwrap();
        let request = &service.requests()[0];
        assert_eq!(request.style_hint.as_deref(), Some("concise"));
        assert_eq!(request.max_length, Some(150));
    }

    #[tokio::test]
    async fn test_empty_provider_reply_falls_back() {
        let service = MockSummaryService::new("   ");
        let client = client(service);
        let outcome = client
            .summarize_detailed("Please confirm the venue booking today.", None)
            .await
            .unwrap();
        assert_eq!(outcome.source, SummarySource::Heuristic);
        assert_eq!(client.stats().transport_failures, 1);
    }

    #[tokio::test]
    async fn test_invalid_response_counts_as_transport() {
        let service = MockSummaryService::new("x");
        service.fail_all(Some(MockFailure::InvalidResponse));
        let client = client(service);
        client.summarize("Some text for the model", None).await.unwrap();
        let stats = client.stats();
        assert_eq!(stats.transport_failures, 1);
        assert_eq!(stats.unauthorized_failures, 0);
        assert_eq!(stats.fallbacks, 1);
    }

    #[tokio::test]
    async fn test_with_config_validates() {
        let config = SummarizerConfig {
            max_input_chars: 0,
            ..Default::default()
        };
        let result = SummarizationClient::with_config(
            MockSummaryService::new("x"),
            ConsentGate::new(true),
            config,
        );
        assert!(matches!(result, Err(SummarizerError::Config(_))));
    }

    #[tokio::test]
    async fn test_input_truncated_before_request() {
        let service = MockSummaryService::new("ok");
        let config = SummarizerConfig {
            max_input_chars: 5,
            ..Default::default()
        };
        let client =
            SummarizationClient::with_config(service.clone(), ConsentGate::new(true), config).unwrap();
        client.summarize("abcdefghij", None).await.unwrap();
        assert_eq!(service.requests()[0].text, "abcde");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_call_releases_its_slot() {
        let service = MockSummaryService::new("ok").with_latency(Duration::from_secs(30));
        let client = client(service.clone());

        let cancelled = tokio::time::timeout(
            Duration::from_secs(1),
            client.summarize("Budget review", None),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(client.inflight_len(), 0);
        assert!(client.cache().is_empty());

        let outcome = client.summarize_detailed("Budget review", None).await.unwrap();
        assert_eq!(outcome.source, SummarySource::Remote);
        assert_eq!(client.inflight_len(), 0);
    }

    #[tokio::test]
    async fn test_finished_calls_leave_no_slots() {
        let client = client(MockSummaryService::new("ok"));
        let (a, b) = tokio::join!(
            client.summarize("Same text", None),
            client.summarize("Same text", None)
        );
        assert_eq!(a.unwrap(), "ok");
        assert_eq!(b.unwrap(), "ok");
        assert_eq!(client.inflight_len(), 0);
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(SummarySource::Remote.to_string(), "remote");
        assert_eq!(SummarySource::Heuristic.as_str(), "heuristic");
    }
}
