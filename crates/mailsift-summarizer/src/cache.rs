//! Summary cache
//!
//! Process-lifetime map from content fingerprint to summary. Remote and
//! heuristic summaries are stored alike. Clones share one map, so a single
//! instance can be injected wherever summaries are produced.

use mailsift_domain::Fingerprint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Diagnostic view of the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached summaries
    pub size: usize,

    /// Cached fingerprints, sorted
    pub entries: Vec<String>,
}

/// Shared, unbounded summary cache
#[derive(Debug, Clone, Default)]
pub struct SummaryCache {
    entries: Arc<Mutex<HashMap<Fingerprint, String>>>,
}

impl SummaryCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached summary for a fingerprint
    pub fn get(&self, key: &Fingerprint) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store a summary
    pub fn insert(&self, key: Fingerprint, summary: impl Into<String>) {
        self.lock().insert(key, summary.into());
    }

    /// Whether a fingerprint is cached
    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.lock().contains_key(key)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached summaries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cached fingerprints, sorted
    pub fn keys(&self) -> Vec<Fingerprint> {
        let mut keys: Vec<_> = self.lock().keys().copied().collect();
        keys.sort();
        keys
    }

    /// Size and key listing
    pub fn stats(&self) -> CacheStats {
        let keys = self.keys();
        CacheStats {
            size: keys.len(),
            entries: keys.iter().map(ToString::to_string).collect(),
        }
    }
}
