//! Configuration for the Summarization Client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request summary options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOptions {
    /// Target summary length in characters
    pub max_length: usize,

    /// Style hint passed to the provider
    pub style: String,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_length: 150,
            style: "concise".to_string(),
        }
    }
}

/// Configuration for the Summarization Client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Minimum spacing between outbound calls, process-wide (ms)
    pub min_interval_ms: u64,

    /// Sanitized input is cut to this many characters
    pub max_input_chars: usize,

    /// Heuristic summaries are cut to this many characters
    pub fallback_max_chars: usize,

    /// Options used when a caller passes none
    pub default_options: SummaryOptions,
}

impl SummarizerConfig {
    /// Minimum call spacing as a Duration
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_input_chars == 0 {
            return Err("max_input_chars must be greater than 0".to_string());
        }
        if self.fallback_max_chars < 4 {
            return Err("fallback_max_chars must leave room for an ellipsis".to_string());
        }
        if self.default_options.max_length == 0 {
            return Err("default_options.max_length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: shorter inputs, tighter spacing
    pub fn aggressive() -> Self {
        Self {
            min_interval_ms: 500,
            max_input_chars: 1000,
            ..Self::default()
        }
    }

    /// Lenient preset: longer inputs, gentler on provider quotas
    pub fn lenient() -> Self {
        Self {
            min_interval_ms: 2000,
            max_input_chars: 4000,
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

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1000,
            max_input_chars: 2000,
            fallback_max_chars: 150,
            default_options: SummaryOptions::default(),
        }
    }
}
