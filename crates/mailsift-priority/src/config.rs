//! Priority engine configuration

use serde::{Deserialize, Serialize};

/// Scoring weights and selection limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Points per keyword found in the subject
    pub subject_weight: u32,

    /// Points per keyword found in the sender
    pub sender_weight: u32,

    /// Points per keyword found in the content preview
    pub content_weight: u32,

    /// Bonus for unread records
    pub unread_bonus: u32,

    /// Bonus for records newer than the recency window
    pub recency_bonus: u32,

    /// Recency window in hours
    pub recency_window_hours: i64,

    /// Scores are clamped to this value
    pub max_score: u8,

    /// How many records `top_emails` returns at most
    pub top_k: usize,

    /// How many records get highlighted at most
    pub highlight_limit: usize,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            subject_weight: 30,
            sender_weight: 20,
            content_weight: 10,
            unread_bonus: 5,
            recency_bonus: 10,
            recency_window_hours: 24,
            max_score: 100,
            top_k: 5,
            highlight_limit: 5,
        }
    }
}

impl PriorityConfig {
    /// Keyword matches only; read state and age are ignored
    pub fn keywords_only() -> Self {
        Self {
            unread_bonus: 0,
            recency_bonus: 0,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_score == 0 {
            return Err("max_score must be greater than 0".to_string());
        }
        if self.recency_window_hours <= 0 {
            return Err("recency_window_hours must be greater than 0".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.highlight_limit > self.top_k {
            return Err("highlight_limit cannot exceed top_k".to_string());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PriorityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.subject_weight, 30);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn test_keywords_only() {
        let config = PriorityConfig::keywords_only();
        assert!(config.validate().is_ok());
        assert_eq!(config.unread_bonus, 0);
        assert_eq!(config.recency_bonus, 0);
    }

    #[test]
    fn test_invalid_limits() {
        let config = PriorityConfig {
            highlight_limit: 6,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PriorityConfig {
            recency_window_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PriorityConfig::keywords_only();
        let parsed = PriorityConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
