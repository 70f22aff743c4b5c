//! Metrics collected across orchestrator cycles

/// Counters for cycles and what they produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleMetrics {
    /// Completed cycles
    pub cycles: usize,

    /// Records extracted, summed over cycles
    pub records: usize,

    /// Summaries applied to the widget
    pub summaries: usize,

    /// Summaries produced by the local heuristic
    pub fallbacks: usize,

    /// Cycles whose extraction failed outright, plus failed summaries
    pub failures: usize,

    /// Store reads or writes that failed
    pub store_failures: usize,

    /// Records highlighted, summed over cycles
    pub highlighted: usize,
}

impl CycleMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished cycle
    pub fn record_cycle(&mut self, records: usize, highlighted: usize) {
        self.cycles += 1;
        self.records += records;
        self.highlighted += highlighted;
    }

    /// Record an applied summary
    pub fn record_summary(&mut self, fallback: bool) {
        self.summaries += 1;
        if fallback {
            self.fallbacks += 1;
        }
    }

    /// Record a failure surfaced in the widget or logs
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Record a store failure
    pub fn record_store_failure(&mut self) {
        self.store_failures += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "MailSift Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Cycles: {}", self.cycles),
            format!("Records extracted: {}", self.records),
            format!("Records highlighted: {}", self.highlighted),
            format!("Summaries: {} ({} local fallback)", self.summaries, self.fallbacks),
            format!("Failures: {}", self.failures),
            format!("Store failures: {}", self.store_failures),
        ];
        lines.join("\n")
    }
}
