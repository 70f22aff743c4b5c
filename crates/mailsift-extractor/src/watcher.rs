//! Mutation Watcher
//!
//! Turns raw child-list notifications into debounced "records possibly
//! changed" events and runs the bounded initial extraction.

use crate::config::WatcherConfig;
use mailsift_domain::{DocumentTree, EmailRecord, Selector, TreeChange};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// One debounced event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Raw notifications received in the window
    pub raw: usize,

    /// Notifications that touched record containers
    pub relevant: usize,
}

/// Result of the initial attach
#[derive(Debug, Clone)]
pub struct InitialExtraction {
    /// Records from the last attempt
    pub records: Vec<EmailRecord>,

    /// Attempts made, including the first
    pub attempts: u32,
}

/// Debounces tree changes scoped to the inbox
#[derive(Debug, Clone)]
pub struct MutationWatcher {
    config: WatcherConfig,
}

impl MutationWatcher {
    /// Create a watcher
    pub fn new(config: WatcherConfig) -> Self {
        Self { config }
    }

    /// Watcher configuration
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Whether a change inserted a record container
    ///
    /// Inserted nodes that are containers, or contain one, count. Removals and
    /// presentation inserts (badges) do not.
    pub fn is_relevant<T: DocumentTree + ?Sized>(
        tree: &T,
        container: &Selector,
        change: &TreeChange,
    ) -> bool {
        change.added.iter().any(|node| {
            tree.contains(*node)
                && (tree.matches(*node, container) || tree.select_first(*node, container).is_some())
        })
    }

    /// Wait for the next debounced batch
    ///
    /// The window opens at the first relevant notification and lasts
    /// `debounce_ms`; everything arriving inside it joins the batch. Returns
    /// `None` once the channel is closed with nothing pending.
    pub async fn next_batch<F>(
        &self,
        changes: &mut UnboundedReceiver<TreeChange>,
        mut relevant: F,
    ) -> Option<ChangeBatch>
    where
        F: FnMut(&TreeChange) -> bool,
    {
        let mut raw = 0;
        loop {
            let change = changes.recv().await?;
            raw += 1;
            if relevant(&change) {
                break;
            }
        }

        let mut batch = ChangeBatch { raw, relevant: 1 };
        let deadline = Instant::now() + self.config.debounce();
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                next = changes.recv() => match next {
                    Some(change) => {
                        batch.raw += 1;
                        if relevant(&change) {
                            batch.relevant += 1;
                        }
                    }
                    None => break,
                },
            }
        }

        debug!(
            "Change batch: {} raw notifications, {} relevant",
            batch.raw, batch.relevant
        );
        Some(batch)
    }

    /// Initial extraction with bounded retries for late-loading inboxes
    ///
    /// Waits `initial_delay_ms`, then calls `extract`. While the result is
    /// empty it retries up to `max_retries` times, `retry_interval_ms` apart.
    pub async fn initial_extraction<F>(&self, mut extract: F) -> InitialExtraction
    where
        F: FnMut() -> Vec<EmailRecord>,
    {
        sleep(self.config.initial_delay()).await;

        let mut attempts = 1;
        let mut records = extract();
        while records.is_empty() && attempts <= self.config.max_retries {
            debug!(
                "Initial extraction empty, retrying ({}/{})",
                attempts, self.config.max_retries
            );
            sleep(self.config.retry_interval()).await;
            attempts += 1;
            records = extract();
        }

        info!(
            "Initial extraction found {} records after {} attempt(s)",
            records.len(),
            attempts
        );
        InitialExtraction { records, attempts }
    }
}

impl Default for MutationWatcher {
    fn default() -> Self {
        Self::new(WatcherConfig::default())
    }
}
