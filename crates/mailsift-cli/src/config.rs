//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use mailsift_domain::{KeywordError, KeywordSet, Settings};
use mailsift_llm::openai::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use mailsift_llm::OpenAiProvider;
use mailsift_orchestrator::{
    settings_value, StoreMap, KEY_CONSENT_GIVEN, KEY_KEYWORDS, KEY_PRIVACY_CONSENT, KEY_SETTINGS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Priority keywords
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Feature toggles
    #[serde(default)]
    pub features: Features,

    /// Summarization consent
    #[serde(default)]
    pub consent: Consent,

    /// Summarization provider
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,
}

/// Feature toggles as stored in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Mark top records in the snapshot
    #[serde(default = "default_true")]
    pub highlight_mode: bool,

    /// Summarize top records
    #[serde(default = "default_true")]
    pub summarization_enabled: bool,

    /// Show the widget
    #[serde(default = "default_true")]
    pub widget_enabled: bool,
}

/// Consent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    /// Whether the user agreed to send email text to the provider
    #[serde(default)]
    pub given: bool,

    /// When consent was granted (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_at: Option<String>,
}

/// Summarization provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Chat-completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Credential; `MAILSIFT_API_KEY` takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".mailsift").join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), or use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path` (or the default path).
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Keyword set, skipping invalid entries.
    pub fn keyword_set(&self) -> (KeywordSet, Vec<(String, KeywordError)>) {
        KeywordSet::from_lossy(&self.keywords)
    }

    /// Feature toggles as domain settings.
    pub fn settings(&self) -> Settings {
        Settings {
            highlight_mode: self.features.highlight_mode,
            summarization_enabled: self.features.summarization_enabled,
            widget_enabled: self.features.widget_enabled,
        }
    }

    /// Record consent.
    pub fn grant_consent(&mut self, granted_at: String) {
        self.consent.given = true;
        self.consent.granted_at = Some(granted_at);
    }

    /// Withdraw consent and switch summarization off.
    pub fn decline_consent(&mut self) {
        self.consent.given = false;
        self.consent.granted_at = None;
        self.features.summarization_enabled = false;
    }

    /// Preferences in the key-value shape the orchestrator's store uses.
    ///
    /// `keywords` replaces the configured list when non-empty. The list is
    /// stored as given; invalid entries are reported when it is loaded.
    pub fn store_values(&self, keywords: &[String]) -> Result<StoreMap> {
        let list = if keywords.is_empty() { &self.keywords[..] } else { keywords };

        let mut values = StoreMap::new();
        values.insert(KEY_KEYWORDS.to_string(), Value::from(list.to_vec()));
        values.insert(
            KEY_SETTINGS.to_string(),
            settings_value(self.settings()).map_err(|e| CliError::Config(e.to_string()))?,
        );
        values.insert(KEY_CONSENT_GIVEN.to_string(), Value::Bool(self.consent.given));
        if let Some(granted_at) = &self.consent.granted_at {
            values.insert(KEY_PRIVACY_CONSENT.to_string(), Value::String(granted_at.clone()));
        }
        Ok(values)
    }

    /// Build the summarization provider.
    ///
    /// `api_key` (from the command line or environment) overrides the file.
    pub fn provider(&self, api_key: Option<&str>) -> Result<OpenAiProvider> {
        let key = api_key
            .map(str::to_string)
            .or_else(|| self.provider.api_key.clone());
        Ok(OpenAiProvider::builder()
            .endpoint(self.provider.endpoint.clone())
            .model(self.provider.model.clone())
            .api_key(key)
            .timeout(Duration::from_secs(self.provider.timeout_secs))
            .build()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            features: Features::default(),
            consent: Consent::default(),
            provider: ProviderSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Default for Features {
    fn default() -> Self {
        Self {
            highlight_mode: true,
            summarization_enabled: true,
            widget_enabled: true,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_keywords() -> Vec<String> {
    KeywordSet::defaults().to_vec()
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
