//! MailSift Orchestrator
//!
//! Ties extraction, scoring, highlighting, summarization and the widget into
//! one pipeline, and owns the user's stored preferences.
//!
//! # Overview
//!
//! The Orchestrator is responsible for:
//! - **Cycles**: extract records, score them, highlight the top few and
//!   refresh the widget
//! - **Summaries**: summarize the top records in the background, paced,
//!   when consent and settings allow it
//! - **Preferences**: load keywords, settings and consent from a
//!   [`SettingsStore`], persist changes and react to outside edits
//! - **Metrics**: counting cycles, summaries and failures
//!
//! # Cycle
//!
//! | Phase | Does | On failure |
//! |-------|------|------------|
//! | **Extracting** | Reads records from the document tree | Widget shows a retryable error |
//! | **Scoring** | Scores and ranks records | Cannot fail |
//! | **Rendering** | Highlights (if enabled) and updates the widget | Stale nodes are skipped |
//! | **Summarizing** | Summarizes up to three top records | Falls back to a local summary |
//!
//! A store that cannot be read leaves the defaults in place, so the
//! pipeline always runs.
//!
//! # Usage
//!
//! ## One-time Cycle
//!
//! ```no_run
//! use mailsift_domain::ConsentGate;
//! use mailsift_extractor::{ExtractorConfig, RecordExtractor, SnapshotTree};
//! use mailsift_llm::MockSummaryService;
//! use mailsift_orchestrator::{MemoryStore, Orchestrator, OrchestratorConfig};
//! use mailsift_priority::PriorityEngine;
//! use mailsift_summarizer::SummarizationClient;
//! use mailsift_widget::{DisplayController, MemorySurface};
//! use std::sync::{Arc, Mutex};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = SnapshotTree::from_json(&std::fs::read_to_string("inbox.json")?)?;
//! let mut orchestrator = Orchestrator::new(
//!     Arc::new(Mutex::new(tree)),
//!     RecordExtractor::for_url("https://mail.google.com/mail/u/0/#inbox", ExtractorConfig::default())?,
//!     PriorityEngine::default_config(),
//!     SummarizationClient::new(MockSummaryService::new("test-key"), ConsentGate::new(true)),
//!     MemoryStore::new(),
//!     DisplayController::new(MemorySurface::new()),
//!     OrchestratorConfig::default(),
//! )?;
//!
//! let report = orchestrator.refresh().await;
//! println!("{} records, {} on top", report.extracted, report.top.len());
//! println!("{}", orchestrator.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! See [`OrchestratorWorker`], which reruns cycles as the inbox changes.
//!
//! # Configuration
//!
//! ```toml
//! [orchestrator]
//! auto_summarize_count = 3
//! pacing_ms = 1000
//! load_on_start = true
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod orchestrator;
mod store;
mod worker;

pub use config::{OrchestratorConfig, EXTRACTION_FAILED_MESSAGE, SUMMARY_FAILED_MESSAGE};
pub use error::OrchestratorError;
pub use metrics::CycleMetrics;
pub use orchestrator::{CyclePhase, CycleReport, Orchestrator, SharedTree};
pub use store::{
    keywords_value, settings_value, MemoryStore, Preferences, SettingsStore, StoreError, StoreMap,
    StoredSettings, KEY_CONSENT_GIVEN, KEY_KEYWORDS, KEY_PRIVACY_CONSENT, KEY_SETTINGS,
    PREFERENCE_KEYS,
};
pub use worker::OrchestratorWorker;
