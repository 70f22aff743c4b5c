//! Process-wide rate limiter for outbound calls

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// At most one call may start per interval
///
/// Callers queue on an async mutex, so concurrent waiters are admitted one
/// at a time in arrival order. Clones share the same clock.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_start: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Limiter allowing one start per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Arc::new(Mutex::new(None)),
        }
    }

    /// Minimum spacing between starts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Suspend until a call may start, then claim the slot
    ///
    /// Returns how long the caller waited.
    pub async fn acquire(&self) -> Duration {
        let mut last_start = self.last_start.lock().await;
        let arrived = Instant::now();
        if let Some(previous) = *last_start {
            let eligible = previous + self.interval;
            if arrived < eligible {
                sleep_until(eligible).await;
            }
        }
        let now = Instant::now();
        *last_start = Some(now);
        now - arrived
    }

    /// Forget the last start
    pub async fn reset(&self) {
        *self.last_start.lock().await = None;
    }
}
