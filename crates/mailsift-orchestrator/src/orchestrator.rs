//! Core Orchestrator: one pass through extract, score, highlight, render
//!
//! A cycle moves `Idle → Extracting → Scoring → Rendering → Idle`.
//! Summaries for the top few records follow in `Summarizing`; each attempt is
//! independent and results are applied by record id, so a summary that lands
//! after its record left the top list is kept but not shown.

use crate::config::{OrchestratorConfig, EXTRACTION_FAILED_MESSAGE, SUMMARY_FAILED_MESSAGE};
use crate::error::OrchestratorError;
use crate::metrics::CycleMetrics;
use crate::store::{
    keywords_value, settings_value, Preferences, SettingsStore, StoreMap, KEY_CONSENT_GIVEN,
    KEY_KEYWORDS, KEY_PRIVACY_CONSENT, KEY_SETTINGS, PREFERENCE_KEYS,
};
use chrono::{DateTime, SecondsFormat, Utc};
use mailsift_domain::{
    DocumentTreeMut, EmailRecord, KeywordError, KeywordSet, RecordId, Selector, Settings,
    SettingsPatch, SummaryService,
};
use mailsift_extractor::{ExtractionReport, RecordExtractor};
use mailsift_priority::{HighlightOutcome, Highlighter, PriorityEngine};
use mailsift_summarizer::{SummarizationClient, SummarizerError, SummaryOutcome, SummarySource};
use mailsift_widget::{DisplayController, RenderSurface};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Document tree shared with whoever mutates the page
pub type SharedTree<T> = Arc<Mutex<T>>;

/// Where the orchestrator is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Waiting for a trigger
    Idle,
    /// Reading records from the tree
    Extracting,
    /// Scoring and ranking
    Scoring,
    /// Highlighting and updating the widget
    Rendering,
    /// Summarizing the top records
    Summarizing,
}

/// What one cycle produced
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Records extracted
    pub extracted: usize,

    /// Records shown in the widget, in rank order
    pub top: Vec<EmailRecord>,

    /// Top records still waiting for a summary
    pub to_summarize: Vec<EmailRecord>,

    /// Highlighting result, if highlighting ran
    pub highlight: Option<HighlightOutcome>,

    /// Extraction failed outright and the error view is showing
    pub extraction_failed: bool,
}

/// Drives the pipeline and owns the user's preferences
pub struct Orchestrator<T, S, St, R> {
    tree: SharedTree<T>,
    extractor: RecordExtractor,
    engine: PriorityEngine,
    highlighter: Highlighter,
    summarizer: SummarizationClient<S>,
    store: St,
    widget: DisplayController<R>,
    preferences: Preferences,
    config: OrchestratorConfig,
    metrics: CycleMetrics,
    phase: CyclePhase,
    prioritized: Vec<EmailRecord>,
    clock: fn() -> DateTime<Utc>,
}

impl<T, S, St, R> Orchestrator<T, S, St, R>
where
    T: DocumentTreeMut,
    S: SummaryService + Send + Sync,
    St: SettingsStore,
    R: RenderSurface,
{
    /// Wire the components together
    ///
    /// Preferences start at their defaults, with consent taken from the
    /// summarizer's gate, until [`load_settings`](Self::load_settings) runs.
    pub fn new(
        tree: SharedTree<T>,
        extractor: RecordExtractor,
        engine: PriorityEngine,
        summarizer: SummarizationClient<S>,
        store: St,
        widget: DisplayController<R>,
        config: OrchestratorConfig,
    ) -> Result<Self, OrchestratorError> {
        config.validate().map_err(OrchestratorError::Config)?;
        let highlighter = Highlighter::new(engine.config().highlight_limit);
        let preferences = Preferences {
            consent_given: summarizer.consent().is_granted(),
            ..Preferences::default()
        };
        Ok(Self {
            tree,
            extractor,
            engine,
            highlighter,
            summarizer,
            store,
            widget,
            preferences,
            config,
            metrics: CycleMetrics::new(),
            phase: CyclePhase::Idle,
            prioritized: Vec::new(),
            clock: Utc::now,
        })
    }

    /// Use a different clock for scoring and consent timestamps
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Handle to the shared tree
    pub fn tree(&self) -> SharedTree<T> {
        Arc::clone(&self.tree)
    }

    /// Locator for record containers
    pub fn container_selector(&self) -> &Selector {
        &self.extractor.profile().locators.container
    }

    /// Current phase
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Metrics so far
    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Preferences in effect
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The widget controller
    pub fn widget(&self) -> &DisplayController<R> {
        &self.widget
    }

    /// The summarization client
    pub fn summarizer(&self) -> &SummarizationClient<S> {
        &self.summarizer
    }

    /// The settings store
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Records from the last successful cycle, ranked
    pub fn records(&self) -> &[EmailRecord] {
        &self.prioritized
    }

    fn set_phase(&mut self, phase: CyclePhase) {
        if self.phase != phase {
            debug!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Whether automatic and background summaries may run
    pub fn summarization_allowed(&self) -> bool {
        self.summarizer.consent().is_granted() && self.preferences.settings.summarization_enabled
    }

    fn sync_gates(&mut self) {
        self.summarizer.consent().set(self.preferences.consent_given);
        if self.preferences.settings.widget_enabled {
            self.widget.show();
        } else {
            self.widget.hide();
        }
    }

    /// Read keywords, settings and consent from the store
    ///
    /// A store failure keeps the current preferences. Returns stored
    /// keywords that were rejected.
    pub async fn load_settings(&mut self) -> Vec<(String, KeywordError)> {
        let values = match self.store.get(&PREFERENCE_KEYS).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Settings store unavailable, keeping current preferences: {}", e);
                self.metrics.record_store_failure();
                return Vec::new();
            }
        };

        let rejected = match self.preferences.merge(&values) {
            Ok(rejected) => rejected,
            Err(e) => {
                warn!("Stored preferences unreadable, keeping current: {}", e);
                self.metrics.record_store_failure();
                return Vec::new();
            }
        };
        for (keyword, reason) in &rejected {
            warn!("Ignoring stored keyword '{}': {}", keyword, reason);
        }
        self.sync_gates();
        info!(
            "Loaded preferences: {} keywords, consent {}",
            self.preferences.keywords.len(),
            self.preferences.consent_given
        );
        rejected
    }

    /// Apply a change notification from the store
    ///
    /// Returns whether a preference changed and a new cycle is due.
    pub fn apply_store_change(&mut self, changes: &StoreMap) -> bool {
        if !PREFERENCE_KEYS.iter().any(|key| changes.contains_key(*key)) {
            return false;
        }
        let before = self.preferences.clone();
        if let Err(e) = self.preferences.merge(changes) {
            warn!("Ignoring malformed preference change: {}", e);
            self.metrics.record_store_failure();
            return false;
        }
        self.sync_gates();
        self.preferences != before
    }

    /// Records currently in the tree, or none if it cannot be read
    pub fn extract_records(&self) -> Vec<EmailRecord> {
        self.extract_report((self.clock)())
            .map(|report| report.records)
            .unwrap_or_default()
    }

    fn extract_report(&self, now: DateTime<Utc>) -> Option<ExtractionReport> {
        match self.tree.lock() {
            Ok(tree) => Some(self.extractor.report(&*tree, now)),
            Err(_) => {
                error!("Document tree lock poisoned, cannot extract");
                None
            }
        }
    }

    /// Extract, score, highlight and render
    ///
    /// Always completes. If extraction fails outright the widget shows a
    /// retryable error instead of the list.
    pub fn run_cycle(&mut self) -> CycleReport {
        let now = (self.clock)();

        self.set_phase(CyclePhase::Extracting);
        let report = match self.extract_report(now) {
            Some(report) if !report.is_total_failure() => report,
            failed => {
                let containers = failed.map(|report| report.containers).unwrap_or(0);
                warn!("Extraction failed for all {} containers", containers);
                self.metrics.record_failure();
                self.widget.set_error(Some(EXTRACTION_FAILED_MESSAGE.to_string()));
                self.set_phase(CyclePhase::Idle);
                return CycleReport {
                    extraction_failed: true,
                    ..Default::default()
                };
            }
        };
        let extracted = report.records.len();

        self.set_phase(CyclePhase::Scoring);
        let prioritized = self
            .engine
            .prioritize_at(report.records, &self.preferences.keywords, now);
        let top = self.engine.top_emails(&prioritized);

        self.set_phase(CyclePhase::Rendering);
        let highlight = self.apply_highlighting(&top);
        self.widget.set_top_emails(top.clone());
        let to_summarize = self.summary_candidates(&top);
        self.prioritized = prioritized;

        let marked = highlight.map(|outcome| outcome.marked).unwrap_or(0);
        self.metrics.record_cycle(extracted, marked);
        info!(
            "Cycle complete: {} records, {} in top list, {} highlighted",
            extracted,
            top.len(),
            marked
        );
        self.set_phase(CyclePhase::Idle);

        CycleReport {
            extracted,
            top,
            to_summarize,
            highlight,
            extraction_failed: false,
        }
    }

    fn apply_highlighting(&self, top: &[EmailRecord]) -> Option<HighlightOutcome> {
        let mut tree = match self.tree.lock() {
            Ok(tree) => tree,
            Err(_) => {
                error!("Document tree lock poisoned, skipping highlighting");
                return None;
            }
        };
        if self.preferences.settings.highlight_mode {
            Some(self.highlighter.apply(&mut *tree, top))
        } else {
            let cleared = self.highlighter.clear(&mut *tree);
            if cleared > 0 {
                debug!("Highlighting off, cleared {} markers", cleared);
            }
            None
        }
    }

    fn summary_candidates(&self, top: &[EmailRecord]) -> Vec<EmailRecord> {
        if !self.summarization_allowed() {
            return Vec::new();
        }
        top.iter()
            .take(self.config.auto_summarize_count)
            .filter(|record| self.widget.state().summary(&record.id).is_none())
            .cloned()
            .collect()
    }

    /// Record a summary attempt's result in the widget and metrics
    pub fn apply_summary_result(
        &mut self,
        id: RecordId,
        result: Result<SummaryOutcome, SummarizerError>,
    ) {
        match result {
            Ok(outcome) => {
                self.metrics
                    .record_summary(outcome.source == SummarySource::Heuristic);
                if !self.widget.state().is_listed(&id) {
                    debug!("Summary for {} arrived after it left the top list", id);
                }
                self.widget.set_summary(id, outcome.text);
            }
            Err(e) => {
                warn!("Summarization failed for {}: {}", id, e);
                self.metrics.record_failure();
            }
        }
    }

    /// Summarize `records` one after another, pausing between attempts
    ///
    /// Records that already have a summary are skipped. Returns how many
    /// summaries were applied.
    pub async fn auto_summarize(&mut self, records: &[EmailRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        self.set_phase(CyclePhase::Summarizing);

        let mut applied = 0;
        let mut attempted = false;
        for record in records {
            if self.widget.state().summary(&record.id).is_some() {
                continue;
            }
            if attempted {
                sleep(self.config.pacing()).await;
            }
            attempted = true;

            let result = self
                .summarizer
                .summarize_detailed(record.summary_source(), None)
                .await;
            if result.is_ok() {
                applied += 1;
            }
            self.apply_summary_result(record.id.clone(), result);
        }

        self.set_phase(CyclePhase::Idle);
        applied
    }

    /// Run a cycle, then summarize its top records
    pub async fn process(&mut self) -> CycleReport {
        let report = self.run_cycle();
        self.auto_summarize(&report.to_summarize).await;
        report
    }

    /// Reload preferences, then [`process`](Self::process)
    ///
    /// This is the retry action of the error view.
    pub async fn refresh(&mut self) -> CycleReport {
        self.load_settings().await;
        self.process().await
    }

    /// Summarize one record on request
    ///
    /// Shows the loading view while working, then the list with the new
    /// summary, or a retryable error. Gated like automatic summaries: consent
    /// first, then the `summarizationEnabled` setting.
    pub async fn summarize_record(&mut self, id: &RecordId) -> Result<String, OrchestratorError> {
        if !self.summarizer.consent().is_granted() {
            return Err(SummarizerError::ConsentRequired.into());
        }
        if !self.preferences.settings.summarization_enabled {
            return Err(OrchestratorError::SummarizationDisabled);
        }
        let record = self
            .prioritized
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownRecord(id.to_string()))?;

        self.widget.set_loading(true);
        match self
            .summarizer
            .summarize_detailed(record.summary_source(), None)
            .await
        {
            Ok(outcome) => {
                let text = outcome.text.clone();
                self.apply_summary_result(record.id, Ok(outcome));
                self.widget.set_loading(false);
                Ok(text)
            }
            Err(e) => {
                warn!("On-demand summary for {} failed: {}", id, e);
                self.metrics.record_failure();
                self.widget.set_error(Some(SUMMARY_FAILED_MESSAGE.to_string()));
                Err(e.into())
            }
        }
    }

    /// Flip a record's summary expansion
    pub fn toggle_expanded(&mut self, id: &RecordId) -> bool {
        self.widget.toggle_expanded(id)
    }

    async fn persist(&mut self, values: StoreMap) {
        if let Err(e) = self.store.set(values).await {
            warn!("Could not persist preferences, continuing with in-memory values: {}", e);
            self.metrics.record_store_failure();
        }
    }

    /// Replace the keyword list, persist it and rerun
    ///
    /// Returns the entries that were rejected.
    pub async fn update_keywords(&mut self, keywords: &[String]) -> Vec<(String, KeywordError)> {
        let (set, rejected) = KeywordSet::from_lossy(keywords);
        self.preferences.keywords = set;
        let values = StoreMap::from([(
            KEY_KEYWORDS.to_string(),
            keywords_value(&self.preferences.keywords),
        )]);
        self.persist(values).await;
        self.process().await;
        rejected
    }

    /// Apply a settings patch, persist it and rerun
    pub async fn update_settings(&mut self, patch: SettingsPatch) -> Settings {
        self.preferences.settings = self.preferences.settings.patched(patch);
        self.sync_gates();
        self.persist_settings().await;
        self.process().await;
        self.preferences.settings
    }

    async fn persist_settings(&mut self) {
        match settings_value(self.preferences.settings) {
            Ok(value) => {
                self.persist(StoreMap::from([(KEY_SETTINGS.to_string(), value)]))
                    .await
            }
            Err(e) => {
                warn!("Could not encode settings: {}", e);
                self.metrics.record_store_failure();
            }
        }
    }

    /// Open the consent gate and record when
    pub async fn grant_consent(&mut self) {
        self.preferences.consent_given = true;
        self.sync_gates();
        let granted_at = (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true);
        let values = StoreMap::from([
            (KEY_CONSENT_GIVEN.to_string(), Value::Bool(true)),
            (KEY_PRIVACY_CONSENT.to_string(), Value::String(granted_at)),
        ]);
        self.persist(values).await;
        info!("Consent granted");
    }

    /// Close the consent gate and switch summarization off
    pub async fn decline_consent(&mut self) {
        self.preferences.consent_given = false;
        self.preferences.settings.summarization_enabled = false;
        self.sync_gates();
        self.persist(StoreMap::from([(KEY_CONSENT_GIVEN.to_string(), Value::Bool(false))]))
            .await;
        self.persist_settings().await;
        info!("Consent declined, summarization disabled");
    }
}
