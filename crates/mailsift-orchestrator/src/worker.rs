//! Background worker that keeps the widget in step with the inbox

use crate::metrics::CycleMetrics;
use crate::orchestrator::{Orchestrator, SharedTree};
use crate::store::SettingsStore;
use crate::OrchestratorError;
use mailsift_domain::{
    DocumentTreeMut, EmailRecord, RecordId, Selector, SummaryService, TreeChange,
};
use mailsift_extractor::{ChangeBatch, MutationWatcher, WatcherConfig};
use mailsift_summarizer::{SummarizationClient, SummarizerError, SummaryOutcome};
use mailsift_widget::RenderSurface;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinSet};
use tokio::time::sleep;

type SummaryResult = (RecordId, Result<SummaryOutcome, SummarizerError>);

/// Background summary tasks
///
/// Finished tasks are reaped before every spawn and by the worker loop, so
/// the set only ever holds tasks that are still running.
struct SummaryTasks {
    tasks: JoinSet<()>,
}

impl SummaryTasks {
    fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.reap();
        self.tasks.spawn(task);
    }

    /// Collect every task that has already finished
    fn reap(&mut self) -> usize {
        let mut reaped = 0;
        while let Some(joined) = self.tasks.try_join_next() {
            log_join(joined);
            reaped += 1;
        }
        reaped
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn abort_all(&mut self) {
        self.tasks.abort_all();
    }

    /// Wait for every remaining task
    async fn join_all(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            log_join(joined);
        }
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if !e.is_cancelled() {
            tracing::error!("Summary task failed: {}", e);
        }
    }
}

/// Background worker that reruns the pipeline when the inbox changes
///
/// Tree changes are debounced by a [`MutationWatcher`] running in its own
/// task. Summaries run in spawned tasks and come back over a channel, so a
/// new cycle never waits for summarization and a late summary is applied
/// to whatever the widget shows at that point.
///
/// # Examples
///
/// ```no_run
/// use mailsift_domain::{ConsentGate, DocumentTree};
/// use mailsift_extractor::{ExtractorConfig, RecordExtractor, SnapshotTree};
/// use mailsift_llm::MockSummaryService;
/// use mailsift_orchestrator::{MemoryStore, Orchestrator, OrchestratorConfig, OrchestratorWorker};
/// use mailsift_priority::PriorityEngine;
/// use mailsift_summarizer::SummarizationClient;
/// use mailsift_widget::{DisplayController, MemorySurface};
/// use std::sync::{Arc, Mutex};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut tree = SnapshotTree::new();
///     let root = tree.root();
///     let changes = tree.subscribe(root);
///     let tree = Arc::new(Mutex::new(tree));
///
///     let extractor = RecordExtractor::for_url(
///         "https://mail.google.com/mail/u/0/#inbox",
///         ExtractorConfig::default(),
///     )?;
///     let summarizer = SummarizationClient::new(
///         MockSummaryService::new("test-key"),
///         ConsentGate::new(false),
///     );
///     let mut orchestrator = Orchestrator::new(
///         tree,
///         extractor,
///         PriorityEngine::default_config(),
///         summarizer,
///         MemoryStore::new(),
///         DisplayController::new(MemorySurface::new()),
///         OrchestratorConfig::default(),
///     )?;
///
///     // Run until Ctrl+C or until the tree stops reporting changes
///     let metrics = OrchestratorWorker::default_config()
///         .run(&mut orchestrator, changes)
///         .await?;
///     println!("{}", metrics.summary());
///     Ok(())
/// }
/// ```
pub struct OrchestratorWorker {
    watcher: MutationWatcher,
}

impl OrchestratorWorker {
    /// Create a worker with the given watcher configuration
    pub fn new(config: WatcherConfig) -> Self {
        Self {
            watcher: MutationWatcher::new(config),
        }
    }

    /// Create a worker with default configuration
    pub fn default_config() -> Self {
        Self::new(WatcherConfig::default())
    }

    /// Watcher configuration
    pub fn config(&self) -> &WatcherConfig {
        self.watcher.config()
    }

    /// Run until Ctrl+C or until `changes` closes
    ///
    /// Loads preferences (if configured to), performs the initial
    /// extraction with retries, then reruns a cycle for every debounced
    /// batch of relevant changes and every preference change. On a closed
    /// change channel, outstanding summaries are awaited and applied
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher task panics.
    pub async fn run<T, S, St, R>(
        &self,
        orchestrator: &mut Orchestrator<T, S, St, R>,
        changes: UnboundedReceiver<TreeChange>,
    ) -> Result<CycleMetrics, OrchestratorError>
    where
        T: DocumentTreeMut + Send + 'static,
        S: SummaryService + Send + Sync + 'static,
        St: SettingsStore,
        R: RenderSurface,
    {
        tracing::info!(
            "Orchestrator worker started (debounce: {:?})",
            self.watcher.config().debounce()
        );

        if orchestrator.config().load_on_start {
            orchestrator.load_settings().await;
        }
        let mut store_changes = orchestrator.store().subscribe();
        let mut store_open = true;

        let initial = self
            .watcher
            .initial_extraction(|| orchestrator.extract_records())
            .await;
        tracing::debug!("Initial attach took {} attempt(s)", initial.attempts);

        let (results_tx, mut results_rx) = mpsc::unbounded_channel::<SummaryResult>();
        let mut summaries = SummaryTasks::new();

        let report = orchestrator.run_cycle();
        spawn_summaries(orchestrator, &mut summaries, &results_tx, report.to_summarize);

        let (batches_tx, mut batches) = mpsc::unbounded_channel::<ChangeBatch>();
        let watcher = tokio::spawn(watch_changes(
            self.watcher.clone(),
            orchestrator.tree(),
            orchestrator.container_selector().clone(),
            changes,
            batches_tx,
        ));

        loop {
            tokio::select! {
                batch = batches.recv() => match batch {
                    Some(batch) => {
                        tracing::debug!("{} relevant change(s), rerunning cycle", batch.relevant);
                        let report = orchestrator.run_cycle();
                        spawn_summaries(orchestrator, &mut summaries, &results_tx, report.to_summarize);
                    }
                    None => {
                        tracing::info!("Change stream closed, stopping orchestrator");
                        break;
                    }
                },
                change = store_changes.recv(), if store_open => match change {
                    Ok(values) => {
                        if orchestrator.apply_store_change(&values) {
                            let report = orchestrator.run_cycle();
                            spawn_summaries(orchestrator, &mut summaries, &results_tx, report.to_summarize);
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Missed {} preference change(s), reloading", missed);
                        orchestrator.load_settings().await;
                        let report = orchestrator.run_cycle();
                        spawn_summaries(orchestrator, &mut summaries, &results_tx, report.to_summarize);
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Settings store stopped sending changes");
                        store_open = false;
                    }
                },
                Some((id, result)) = results_rx.recv() => {
                    orchestrator.apply_summary_result(id, result);
                }
                Some(joined) = summaries.tasks.join_next(), if !summaries.is_empty() => {
                    log_join(joined);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping orchestrator");
                    summaries.abort_all();
                    break;
                }
            }
        }

        summaries.join_all().await;
        drop(results_tx);
        while let Some((id, result)) = results_rx.recv().await {
            orchestrator.apply_summary_result(id, result);
        }

        watcher.abort();
        if let Err(e) = watcher.await {
            if !e.is_cancelled() {
                return Err(OrchestratorError::Worker(e.to_string()));
            }
        }

        let metrics = orchestrator.metrics().clone();
        tracing::info!("Orchestrator stopped. Final metrics:\n{}", metrics.summary());
        Ok(metrics)
    }
}

async fn watch_changes<T>(
    watcher: MutationWatcher,
    tree: SharedTree<T>,
    container: Selector,
    mut changes: UnboundedReceiver<TreeChange>,
    batches: UnboundedSender<ChangeBatch>,
) where
    T: DocumentTreeMut,
{
    let mut relevant = |change: &TreeChange| match tree.lock() {
        Ok(tree) => MutationWatcher::is_relevant(&*tree, &container, change),
        Err(_) => false,
    };
    while let Some(batch) = watcher.next_batch(&mut changes, &mut relevant).await {
        if batches.send(batch).is_err() {
            break;
        }
    }
}

fn spawn_summaries<T, S, St, R>(
    orchestrator: &Orchestrator<T, S, St, R>,
    tasks: &mut SummaryTasks,
    results: &UnboundedSender<SummaryResult>,
    records: Vec<EmailRecord>,
) where
    T: DocumentTreeMut,
    S: SummaryService + Send + Sync + 'static,
    St: SettingsStore,
    R: RenderSurface,
{
    if records.is_empty() {
        return;
    }
    let client = orchestrator.summarizer().clone();
    let pacing = orchestrator.config().pacing();
    let results = results.clone();
    tasks.spawn(summarize_paced(client, records, pacing, results));
}

async fn summarize_paced<S>(
    client: SummarizationClient<S>,
    records: Vec<EmailRecord>,
    pacing: Duration,
    results: UnboundedSender<SummaryResult>,
) where
    S: SummaryService + Send + Sync,
{
    for (index, record) in records.into_iter().enumerate() {
        if index > 0 {
            sleep(pacing).await;
        }
        let result = client.summarize_detailed(record.summary_source(), None).await;
        if results.send((record.id, result)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_finished_tasks_do_not_accumulate() {
        let mut tasks = SummaryTasks::new();
        for _ in 0..100 {
            tasks.spawn(async {});
            tokio::task::yield_now().await;
            sleep(Duration::from_millis(10)).await;
        }
        assert!(tasks.len() <= 1);

        tasks.join_all().await;
        assert!(tasks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_leaves_running_tasks() {
        let mut tasks = SummaryTasks::new();
        tasks.spawn(async {});
        tasks.spawn(sleep(Duration::from_secs(60)));
        sleep(Duration::from_millis(10)).await;

        assert_eq!(tasks.reap(), 1);
        assert_eq!(tasks.len(), 1);

        tasks.abort_all();
        tasks.join_all().await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_panicked_task_is_reaped() {
        let mut tasks = SummaryTasks::new();
        tasks.spawn(async { panic!("boom") });
        tasks.join_all().await;
        assert!(tasks.is_empty());
    }
}
