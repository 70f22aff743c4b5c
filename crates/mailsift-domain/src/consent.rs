//! Consent gate - external precondition for any summarization

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared consent flag
///
/// Clones observe the same flag. Scoring and highlighting never consult it;
/// summarization (remote or local) must not start while it is closed.
#[derive(Debug, Clone, Default)]
pub struct ConsentGate {
    granted: Arc<AtomicBool>,
}

impl ConsentGate {
    /// Create a gate in the given state
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
        }
    }

    /// Whether consent has been granted
    pub fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    /// Open or close the gate
    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}
