//! Configuration for the Extractor and Mutation Watcher

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Record Extractor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Characters of flattened text hashed into a fallback identity
    pub fingerprint_chars: usize,

    /// Search for containers only inside the inbox locator when it matches
    pub scope_to_inbox: bool,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.fingerprint_chars == 0 {
            return Err("fingerprint_chars must be greater than 0".to_string());
        }
        Ok(())
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fingerprint_chars: 100,
            scope_to_inbox: true,
        }
    }
}

/// Configuration for the Mutation Watcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Window during which raw notifications collapse into one event (ms)
    pub debounce_ms: u64,

    /// Delay before the first extraction after attaching (ms)
    pub initial_delay_ms: u64,

    /// Spacing between empty initial extractions (ms)
    pub retry_interval_ms: u64,

    /// Extra attempts when the first extraction is empty
    pub max_retries: u32,
}

impl WatcherConfig {
    /// Debounce window as a Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Initial delay as a Duration
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Retry spacing as a Duration
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("debounce_ms must be greater than 0".to_string());
        }
        if self.max_retries > 0 && self.retry_interval_ms == 0 {
            return Err("retry_interval_ms must be greater than 0 when retries are enabled".to_string());
        }
        if self.max_retries > 10 {
            return Err("max_retries cannot exceed 10".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: react quickly, give up quickly
    pub fn aggressive() -> Self {
        Self {
            debounce_ms: 200,
            initial_delay_ms: 100,
            retry_interval_ms: 500,
            max_retries: 2,
        }
    }

    /// Lenient preset: coalesce more, wait longer for slow inboxes
    pub fn lenient() -> Self {
        Self {
            debounce_ms: 1000,
            initial_delay_ms: 1000,
            retry_interval_ms: 2000,
            max_retries: 5,
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

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            initial_delay_ms: 500,
            retry_interval_ms: 1000,
            max_retries: 3,
        }
    }
}
