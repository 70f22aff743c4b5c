//! Configuration for the Orchestrator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message shown when a cycle could not read the inbox
pub const EXTRACTION_FAILED_MESSAGE: &str = "Could not read the inbox. Please try again.";

/// Message shown when an on-demand summary fails
pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to summarize email. Please try again.";

/// Configuration for the Orchestrator
///
/// # Examples
///
/// ```
/// use mailsift_orchestrator::OrchestratorConfig;
///
/// let config = OrchestratorConfig::default();
/// assert_eq!(config.auto_summarize_count, 3);
/// assert_eq!(config.pacing_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How many of the top records are summarized after each cycle
    pub auto_summarize_count: usize,

    /// Pause between consecutive automatic summaries (ms)
    pub pacing_ms: u64,

    /// Load preferences from the store before the first cycle
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

fn default_true() -> bool {
    true
}

impl OrchestratorConfig {
    /// Pacing as a Duration
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.auto_summarize_count > 5 {
            return Err("auto_summarize_count cannot exceed the top list size (5)".to_string());
        }
        Ok(())
    }

    /// No automatic summaries, only on request
    pub fn on_demand() -> Self {
        Self {
            auto_summarize_count: 0,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auto_summarize_count: 3,
            pacing_ms: 1000,
            load_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(OrchestratorConfig::default().validate().is_ok());
        assert!(OrchestratorConfig::on_demand().validate().is_ok());
    }

    #[test]
    fn test_too_many_auto_summaries() {
        let config = OrchestratorConfig {
            auto_summarize_count: 6,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_defaults_load_on_start() {
        let config = OrchestratorConfig::from_toml("auto_summarize_count = 2\npacing_ms = 250\n").unwrap();
        assert_eq!(config.auto_summarize_count, 2);
        assert_eq!(config.pacing(), Duration::from_millis(250));
        assert!(config.load_on_start);
    }
}
