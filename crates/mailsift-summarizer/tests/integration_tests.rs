//! Integration tests for the Summarization Client
//!
//! Exercise the full pipeline against the mock provider, with tokio time
//! paused wherever spacing matters.

use mailsift_domain::{ConsentGate, Fingerprint};
use mailsift_llm::{MockFailure, MockSummaryService};
use mailsift_summarizer::{
    RateLimiter, SummarizationClient, SummarizerError, SummaryCache, SummarySource,
};
use std::time::Duration;

fn consented(service: &MockSummaryService) -> SummarizationClient<MockSummaryService> {
    SummarizationClient::new(service.clone(), ConsentGate::new(true))
}

#[tokio::test(start_paused = true)]
async fn test_identical_text_calls_provider_once() {
    let service = MockSummaryService::new("Budget approved.");
    let client = consented(&service);

    let first = client.summarize_detailed("The budget was approved", None).await.unwrap();
    let second = client.summarize_detailed("The budget was approved", None).await.unwrap();

    assert_eq!(service.call_count(), 1);
    assert_eq!(first.text, second.text);
    assert_eq!(first.source, SummarySource::Remote);
    assert_eq!(second.source, SummarySource::Cached);
    assert_eq!(client.stats().cache_hits, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_skips_rate_limit() {
    let service = MockSummaryService::new("ok");
    let client = consented(&service);
    client.summarize("alpha text", None).await.unwrap();

    let start = tokio::time::Instant::now();
    client.summarize("alpha text", None).await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_distinct_calls_are_spaced_by_interval() {
    let service = MockSummaryService::new("ok");
    let client = consented(&service);

    client.summarize("first distinct text", None).await.unwrap();
    client.summarize("second distinct text", None).await.unwrap();

    let instants = service.call_instants();
    assert_eq!(instants.len(), 2);
    assert!(instants[1] - instants[0] >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_budget() {
    let service = MockSummaryService::new("ok");
    let client = consented(&service);

    let a = {
        let client = client.clone();
        tokio::spawn(async move { client.summarize("text one", None).await })
    };
    let b = {
        let client = client.clone();
        tokio::spawn(async move { client.summarize("text two", None).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let mut instants = service.call_instants();
    instants.sort();
    assert!(instants[1] - instants[0] >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_identical_requests_coalesce() {
    let service = MockSummaryService::new("ok").with_latency(Duration::from_millis(300));
    let client = consented(&service);

    let tasks: Vec<_> = (0..3)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.summarize_detailed("same text", None).await })
        })
        .collect();

    let mut sources = Vec::new();
    for task in tasks {
        sources.push(task.await.unwrap().unwrap().source);
    }
    assert_eq!(service.call_count(), 1);
    assert_eq!(sources.iter().filter(|s| **s == SummarySource::Remote).count(), 1);
    assert_eq!(sources.iter().filter(|s| **s == SummarySource::Cached).count(), 2);
}

#[tokio::test]
async fn test_no_credential_uses_heuristic_without_call() {
    let service = MockSummaryService::unconfigured();
    let client = consented(&service);

    let outcome = client
        .summarize_detailed("Please review the attached report urgently.", None)
        .await
        .unwrap();

    assert!(!outcome.text.is_empty());
    assert!(outcome.text.contains("review") || outcome.text.contains("urgently"));
    assert_eq!(outcome.source, SummarySource::Heuristic);
    assert_eq!(service.call_count(), 0);
    assert_eq!(client.stats().fallbacks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_degrades_and_is_cached() {
    let service = MockSummaryService::new("unused");
    service.fail_all(Some(MockFailure::Unauthorized));
    let client = consented(&service);

    let text = "Reminder: the deadline for expenses is Friday.";
    let first = client.summarize_detailed(text, None).await.unwrap();
    assert_eq!(first.source, SummarySource::Heuristic);
    assert!(first.text.contains("deadline"));

    let second = client.summarize_detailed(text, None).await.unwrap();
    assert_eq!(second.source, SummarySource::Cached);
    assert_eq!(second.text, first.text);
    assert_eq!(service.call_count(), 1);
    assert_eq!(client.stats().unauthorized_failures, 1);
}

#[tokio::test]
async fn test_transport_failure_degrades() {
    let service = MockSummaryService::new("unused");
    service.add_failure("Network trouble ahead for everyone", MockFailure::Transport);
    let client = consented(&service);

    let summary = client
        .summarize("Network trouble ahead for everyone", None)
        .await
        .unwrap();
    assert_eq!(summary, "Network trouble ahead for everyone.");
    assert_eq!(client.stats().transport_failures, 1);
}

#[tokio::test]
async fn test_empty_input_is_rejected_without_call() {
    let service = MockSummaryService::new("x");
    let client = consented(&service);

    assert_eq!(client.summarize("", None).await, Err(SummarizerError::EmptyInput));
    assert_eq!(client.summarize("   \n\t", None).await, Err(SummarizerError::EmptyInput));
    assert_eq!(service.call_count(), 0);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_consent_required() {
    let service = MockSummaryService::new("x");
    let gate = ConsentGate::new(false);
    let client = SummarizationClient::new(service.clone(), gate.clone());

    assert_eq!(
        client.summarize("anything at all", None).await,
        Err(SummarizerError::ConsentRequired)
    );
    assert_eq!(service.call_count(), 0);

    gate.set(true);
    assert!(client.summarize("anything at all", None).await.is_ok());
}

#[tokio::test]
async fn test_markup_only_input_gets_placeholder() {
    let client = consented(&MockSummaryService::unconfigured());
    let summary = client.summarize("<div><img/></div>", None).await.unwrap();
    assert_eq!(summary, mailsift_summarizer::PLACEHOLDER_SUMMARY);
}

#[tokio::test(start_paused = true)]
async fn test_shared_cache_and_limiter_between_clients() {
    let cache = SummaryCache::new();
    let limiter = RateLimiter::new(Duration::from_secs(1));
    let service = MockSummaryService::new("shared");

    let one = consented(&service).with_cache(cache.clone()).with_limiter(limiter.clone());
    let two = consented(&service).with_cache(cache.clone()).with_limiter(limiter);

    one.summarize("common text", None).await.unwrap();
    let outcome = two.summarize_detailed("common text", None).await.unwrap();
    assert_eq!(outcome.source, SummarySource::Cached);
    assert!(cache.contains(&Fingerprint::of("common text")));

    two.summarize("other text", None).await.unwrap();
    let instants = service.call_instants();
    assert!(instants[1] - instants[0] >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_clear_cache_forces_new_call() {
    let service = MockSummaryService::new("ok");
    let client = SummarizationClient::new(service.clone(), ConsentGate::new(true))
        .with_limiter(RateLimiter::new(Duration::ZERO));

    client.summarize("repeatable", None).await.unwrap();
    client.cache().clear();
    client.summarize("repeatable", None).await.unwrap();
    assert_eq!(service.call_count(), 2);
    assert_eq!(client.cache().stats().size, 1);
}
