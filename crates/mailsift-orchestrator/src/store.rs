//! Key-value settings store seam
//!
//! Values are JSON so that the same keys work for any backing store. The
//! orchestrator decodes them into typed preferences and treats every store
//! failure as "keep what we have".

use mailsift_domain::{KeywordError, KeywordSet, Settings, SettingsPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;

/// Keyword list
pub const KEY_KEYWORDS: &str = "keywords";

/// Feature toggles object
pub const KEY_SETTINGS: &str = "settings";

/// Consent flag
pub const KEY_CONSENT_GIVEN: &str = "consentGiven";

/// When consent was granted (RFC 3339)
pub const KEY_PRIVACY_CONSENT: &str = "privacyConsent";

/// Every key the orchestrator reads
pub const PREFERENCE_KEYS: [&str; 3] = [KEY_KEYWORDS, KEY_SETTINGS, KEY_CONSENT_GIVEN];

/// Partial key-value map
pub type StoreMap = HashMap<String, Value>;

/// Errors from the settings store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored value had the wrong shape
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Asynchronous key-value store with change notifications
pub trait SettingsStore: Send + Sync {
    /// Values for the requested keys; missing keys are absent from the map
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<StoreMap, StoreError>> + Send;

    /// Write values and notify subscribers
    fn set(&self, values: StoreMap) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Receive every successful `set` as the map that was written
    fn subscribe(&self) -> broadcast::Receiver<StoreMap>;
}

/// Stored shape of the feature toggles; absent fields keep defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    /// Highlight toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_mode: Option<bool>,

    /// Summarization toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarization_enabled: Option<bool>,

    /// Widget toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_enabled: Option<bool>,
}

impl From<Settings> for StoredSettings {
    fn from(settings: Settings) -> Self {
        Self {
            highlight_mode: Some(settings.highlight_mode),
            summarization_enabled: Some(settings.summarization_enabled),
            widget_enabled: Some(settings.widget_enabled),
        }
    }
}

impl From<StoredSettings> for SettingsPatch {
    fn from(stored: StoredSettings) -> Self {
        SettingsPatch {
            highlight_mode: stored.highlight_mode,
            summarization_enabled: stored.summarization_enabled,
            widget_enabled: stored.widget_enabled,
        }
    }
}

/// Typed view of the stored preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// User keywords
    pub keywords: KeywordSet,

    /// Feature toggles
    pub settings: Settings,

    /// Whether consent was given
    pub consent_given: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            keywords: KeywordSet::defaults(),
            settings: Settings::default(),
            consent_given: false,
        }
    }
}

impl Preferences {
    /// Overlay the keys present in `values` onto `self`
    ///
    /// Invalid keywords are skipped and returned. A value of the wrong
    /// shape fails the whole merge and leaves `self` unchanged.
    pub fn merge(&mut self, values: &StoreMap) -> Result<Vec<(String, KeywordError)>, StoreError> {
        let mut next = self.clone();
        let mut rejected = Vec::new();

        if let Some(value) = values.get(KEY_KEYWORDS) {
            let raw: Vec<String> = serde_json::from_value(value.clone())?;
            let (keywords, skipped) = KeywordSet::from_lossy(raw);
            next.keywords = keywords;
            rejected = skipped;
        }
        if let Some(value) = values.get(KEY_SETTINGS) {
            let stored: StoredSettings = serde_json::from_value(value.clone())?;
            next.settings = Settings::default().patched(stored.into());
        }
        if let Some(value) = values.get(KEY_CONSENT_GIVEN) {
            next.consent_given = serde_json::from_value(value.clone())?;
        }

        *self = next;
        Ok(rejected)
    }
}

/// Encode a keyword list for the store
pub fn keywords_value(keywords: &KeywordSet) -> Value {
    Value::from(keywords.to_vec())
}

/// Encode settings for the store
pub fn settings_value(settings: Settings) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(StoredSettings::from(settings))?)
}

/// In-memory store for tests and the command line
///
/// Clones share contents and subscribers. Can be switched to fail every
/// call to exercise degraded paths.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<StoreMap>>,
    unavailable: Arc<AtomicBool>,
    changes: broadcast::Sender<StoreMap>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
            changes,
        }
    }

    /// Store pre-filled with `values`, without notifying anyone
    pub fn with_values(values: StoreMap) -> Self {
        let store = Self::new();
        *store.lock() = values;
        store
    }

    fn lock(&self) -> MutexGuard<'_, StoreMap> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every call fail (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current value of a key
    pub fn value(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError> {
        self.check()?;
        let values = self.lock();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, values: StoreMap) -> Result<(), StoreError> {
        self.check()?;
        self.lock().extend(values.clone());
        // No subscribers is fine.
        let _ = self.changes.send(values);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreMap> {
        self.changes.subscribe()
    }
}
