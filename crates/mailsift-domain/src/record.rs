//! Email record module - one inbox entry at a point in time

use crate::tier::PriorityTier;
use crate::tree::NodeId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// Subject used when none can be extracted
pub const DEFAULT_SUBJECT: &str = "No Subject";

/// Sender used when none can be extracted
pub const DEFAULT_SENDER: &str = "Unknown Sender";

/// Derived identity of an inbox entry
///
/// Stable across re-extractions of the same underlying entry. Never derived
/// from node handles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a derived identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One inbox entry
///
/// `source_ref` is a non-owning handle to the originating node. It is only
/// used for presentation (highlighting) and is ignored by equality.
#[derive(Debug, Clone)]
pub struct EmailRecord {
    /// Derived identity
    pub id: RecordId,

    /// Subject line (defaults to "No Subject")
    pub subject: String,

    /// Sender display text (defaults to "Unknown Sender")
    pub sender: String,

    /// Body preview (defaults to empty)
    pub content: String,

    /// Timestamp as found on the page, or extraction time in RFC 3339
    pub timestamp: String,

    /// Whether the entry has been read
    pub is_read: bool,

    /// Priority score 0..=100, recomputed on every scoring pass
    pub priority: u8,

    /// Originating node, if still meaningful
    pub source_ref: Option<NodeId>,
}

impl EmailRecord {
    /// Create an unscored record with no node reference
    pub fn new(
        id: impl Into<RecordId>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
        is_read: bool,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            sender: sender.into(),
            content: content.into(),
            timestamp: timestamp.into(),
            is_read,
            priority: 0,
            source_ref: None,
        }
    }

    /// Attach the originating node
    pub fn with_source(mut self, node: NodeId) -> Self {
        self.source_ref = Some(node);
        self
    }

    /// Parse the timestamp, if it is in a recognised format
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Presentation tier for the current priority
    pub fn tier(&self) -> PriorityTier {
        PriorityTier::from_score(self.priority)
    }

    /// Text handed to the summarizer: the preview, else the subject
    pub fn summary_source(&self) -> &str {
        if self.content.trim().is_empty() {
            &self.subject
        } else {
            &self.content
        }
    }
}

impl PartialEq for EmailRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.subject == other.subject
            && self.sender == other.sender
            && self.content == other.content
            && self.timestamp == other.timestamp
            && self.is_read == other.is_read
            && self.priority == other.priority
    }
}

impl Eq for EmailRecord {}

/// Parse a page or ISO-8601 timestamp into UTC
///
/// Accepts RFC 3339, RFC 2822, and naive `YYYY-MM-DD[ HH:MM:SS]` forms (taken as
/// UTC). Anything else, including clock-only labels like "10:32 AM", is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> EmailRecord {
        EmailRecord::new("r1", "Budget", "Alice", "Numbers inside", "2025-03-01T10:00:00Z", false)
    }

    #[test]
    fn test_equality_ignores_source_ref() {
        let a = record();
        let b = record().with_source(NodeId::new(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_includes_priority() {
        let a = record();
        let mut b = record();
        b.priority = 10;
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(record().parsed_timestamp(), Some(expected));
    }

    #[test]
    fn test_parse_rfc2822_and_naive() {
        assert!(parse_timestamp("Sat, 01 Mar 2025 10:00:00 +0000").is_some());
        assert!(parse_timestamp("2025-03-01 10:00:00").is_some());
        assert!(parse_timestamp("2025-03-01").is_some());
    }

    #[test]
    fn test_unparsable_timestamps() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("10:32 AM").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_summary_source_falls_back_to_subject() {
        let mut r = record();
        assert_eq!(r.summary_source(), "Numbers inside");
        r.content = "   ".to_string();
        assert_eq!(r.summary_source(), "Budget");
    }
}
