//! Display state owned by the controller

use mailsift_domain::{EmailRecord, RecordId};
use std::collections::{HashMap, HashSet};

/// Everything the widget renders from
///
/// Summaries and expansion flags are keyed by record id and outlive the
/// records they belong to, so a record that drops out of the top list and
/// comes back keeps its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// Records to list, in rank order
    pub top_emails: Vec<EmailRecord>,

    /// Summary text per record
    pub summaries: HashMap<RecordId, String>,

    /// Records whose summary is shown in full
    pub expanded: HashSet<RecordId>,

    /// Whether a long-running operation is in progress
    pub loading: bool,

    /// Error shown in place of the list
    pub error: Option<String>,

    /// Whether the widget is shown at all
    pub visible: bool,

    /// Whether the widget is collapsed to its header
    pub minimized: bool,
}

impl DisplayState {
    /// Summary for a record, if one has arrived
    pub fn summary(&self, id: &RecordId) -> Option<&str> {
        self.summaries.get(id).map(String::as_str)
    }

    /// Whether a record's summary is expanded
    pub fn is_expanded(&self, id: &RecordId) -> bool {
        self.expanded.contains(id)
    }

    /// Whether a record is currently listed
    pub fn is_listed(&self, id: &RecordId) -> bool {
        self.top_emails.iter().any(|record| &record.id == id)
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            top_emails: Vec::new(),
            summaries: HashMap::new(),
            expanded: HashSet::new(),
            loading: false,
            error: None,
            visible: true,
            minimized: false,
        }
    }
}
