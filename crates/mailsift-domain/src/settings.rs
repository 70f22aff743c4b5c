//! Settings module - feature toggles read on every cycle

/// User feature toggles
///
/// Created with defaults on first run. Only the orchestrator mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Mark top records in the document tree
    pub highlight_mode: bool,

    /// Allow summarization (still subject to consent)
    pub summarization_enabled: bool,

    /// Show the top-emails widget
    pub widget_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            highlight_mode: true,
            summarization_enabled: true,
            widget_enabled: true,
        }
    }
}

/// Partial update to [`Settings`]; `None` leaves a field unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    /// New highlight toggle
    pub highlight_mode: Option<bool>,
    /// New summarization toggle
    pub summarization_enabled: Option<bool>,
    /// New widget toggle
    pub widget_enabled: Option<bool>,
}

impl Settings {
    /// Return a copy with the patch applied
    pub fn patched(mut self, patch: SettingsPatch) -> Self {
        if let Some(value) = patch.highlight_mode {
            self.highlight_mode = value;
        }
        if let Some(value) = patch.summarization_enabled {
            self.summarization_enabled = value;
        }
        if let Some(value) = patch.widget_enabled {
            self.widget_enabled = value;
        }
        self
    }
}
