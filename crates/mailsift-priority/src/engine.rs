//! Priority scoring and ranking

use crate::config::PriorityConfig;
use crate::error::PriorityError;
use chrono::{DateTime, Duration, Utc};
use mailsift_domain::{EmailRecord, KeywordSet};

/// Scores and ranks records against the user's keywords
///
/// Scoring is pure apart from the recency bonus, which compares against
/// "now"; the `_at` variants take "now" explicitly.
#[derive(Debug, Clone)]
pub struct PriorityEngine {
    config: PriorityConfig,
}

impl PriorityEngine {
    /// Create an engine with the given configuration
    pub fn new(config: PriorityConfig) -> Result<Self, PriorityError> {
        config.validate().map_err(PriorityError::Config)?;
        Ok(Self { config })
    }

    /// Create an engine with default weights
    pub fn default_config() -> Self {
        Self {
            config: PriorityConfig::default(),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &PriorityConfig {
        &self.config
    }

    /// Score a record against the current time
    pub fn score(&self, record: &EmailRecord, keywords: &KeywordSet) -> u8 {
        self.score_at(record, keywords, Utc::now())
    }

    /// Score a record
    ///
    /// Each keyword contributes independently for every field it appears in
    /// (case-insensitive substring match), then the unread and recency
    /// bonuses are added and the sum is clamped to `max_score`.
    pub fn score_at(&self, record: &EmailRecord, keywords: &KeywordSet, now: DateTime<Utc>) -> u8 {
        let subject = record.subject.to_lowercase();
        let sender = record.sender.to_lowercase();
        let content = record.content.to_lowercase();

        let mut sum: u64 = 0;
        for keyword in keywords.folded() {
            if subject.contains(keyword) {
                sum += u64::from(self.config.subject_weight);
            }
            if sender.contains(keyword) {
                sum += u64::from(self.config.sender_weight);
            }
            if content.contains(keyword) {
                sum += u64::from(self.config.content_weight);
            }
        }

        if !record.is_read {
            sum += u64::from(self.config.unread_bonus);
        }
        if self.is_recent(record, now) {
            sum += u64::from(self.config.recency_bonus);
        }

        sum.min(u64::from(self.config.max_score)) as u8
    }

    /// Whether the record is inside the recency window
    ///
    /// Unparsable timestamps are never recent.
    pub fn is_recent(&self, record: &EmailRecord, now: DateTime<Utc>) -> bool {
        record
            .parsed_timestamp()
            .map(|timestamp| now - timestamp < Duration::hours(self.config.recency_window_hours))
            .unwrap_or(false)
    }

    /// Score every record and sort by score, highest first
    pub fn prioritize(&self, records: Vec<EmailRecord>, keywords: &KeywordSet) -> Vec<EmailRecord> {
        self.prioritize_at(records, keywords, Utc::now())
    }

    /// Score every record and sort by score, highest first
    ///
    /// The sort is stable: equal scores keep their input order.
    pub fn prioritize_at(
        &self,
        mut records: Vec<EmailRecord>,
        keywords: &KeywordSet,
        now: DateTime<Utc>,
    ) -> Vec<EmailRecord> {
        for record in &mut records {
            record.priority = self.score_at(record, keywords, now);
        }
        records.sort_by(|a, b| b.priority.cmp(&a.priority));
        records
    }

    /// First `top_k` records with a positive score
    ///
    /// Expects the output of [`prioritize`](Self::prioritize).
    pub fn top_emails(&self, prioritized: &[EmailRecord]) -> Vec<EmailRecord> {
        top_emails(prioritized, self.config.top_k)
    }
}

/// First `k` records with a positive score, in the given order
pub fn top_emails(prioritized: &[EmailRecord], k: usize) -> Vec<EmailRecord> {
    prioritized
        .iter()
        .filter(|record| record.priority > 0)
        .take(k)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn keywords(items: &[&str]) -> KeywordSet {
        KeywordSet::from_lossy(items).0
    }

    fn record(id: &str, subject: &str, sender: &str, content: &str, timestamp: &str, is_read: bool) -> EmailRecord {
        EmailRecord::new(id, subject, sender, content, timestamp, is_read)
    }

    #[test]
    fn test_documented_example_scores_55() {
        let engine = PriorityEngine::default_config();
        let r = record(
            "a",
            "Budget deadline",
            "alice@example.com",
            "The deadline is Friday",
            "2025-03-01T12:00:00Z",
            false,
        );
        assert_eq!(engine.score_at(&r, &keywords(&["deadline"]), now()), 55);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_additive() {
        let engine = PriorityEngine::default_config();
        let r = record("a", "URGENT", "urgent-desk", "urgent stuff", "", true);
        assert_eq!(engine.score_at(&r, &keywords(&["Urgent"]), now()), 60);
    }

    #[test]
    fn test_keywords_contribute_independently() {
        let engine = PriorityEngine::default_config();
        let r = record("a", "Meeting about the budget", "Bob", "", "", true);
        assert_eq!(engine.score_at(&r, &keywords(&["meeting", "budget"]), now()), 60);
    }

    #[test]
    fn test_clamped_to_100() {
        let engine = PriorityEngine::default_config();
        let r = record(
            "a",
            "urgent important meeting",
            "urgent important",
            "urgent important meeting",
            "2025-03-01T11:00:00Z",
            false,
        );
        let kw = keywords(&["urgent", "important", "meeting"]);
        assert_eq!(engine.score_at(&r, &kw, now()), 100);
    }

    #[test]
    fn test_recency_window() {
        let engine = PriorityEngine::default_config();
        let kw = KeywordSet::new();
        let fresh = record("a", "s", "f", "", "2025-02-28T12:00:01Z", true);
        let stale = record("b", "s", "f", "", "2025-02-28T12:00:00Z", true);
        let unparsable = record("c", "s", "f", "", "10:32 AM", true);
        assert_eq!(engine.score_at(&fresh, &kw, now()), 10);
        assert_eq!(engine.score_at(&stale, &kw, now()), 0);
        assert_eq!(engine.score_at(&unparsable, &kw, now()), 0);
    }

    #[test]
    fn test_prioritize_is_stable() {
        let engine = PriorityEngine::default_config();
        let records = vec![
            record("first", "hello", "x", "", "", true),
            record("high", "deadline", "x", "", "", true),
            record("second", "hello", "x", "", "", true),
        ];
        let sorted = engine.prioritize_at(records, &keywords(&["deadline"]), now());
        let ids: Vec<_> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "first", "second"]);
        assert_eq!(sorted[0].priority, 30);
        assert_eq!(sorted[1].priority, 0);
    }

    #[test]
    fn test_top_emails_excludes_zero_scores() {
        let engine = PriorityEngine::default_config();
        let records = vec![
            record("a", "deadline", "x", "", "", true),
            record("b", "nothing", "x", "", "", true),
            record("c", "nothing", "x", "", "", true),
        ];
        let sorted = engine.prioritize_at(records, &keywords(&["deadline"]), now());
        let top = engine.top_emails(&sorted);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id.as_str(), "a");

        let none = engine.prioritize_at(
            vec![record("z", "nothing", "x", "", "", true)],
            &KeywordSet::new(),
            now(),
        );
        assert!(engine.top_emails(&none).is_empty());
    }

    #[test]
    fn test_top_emails_caps_at_k() {
        let records: Vec<_> = (0..8)
            .map(|i| {
                let mut r = record(&format!("r{}", i), "s", "f", "", "", false);
                r.priority = 5;
                r
            })
            .collect();
        assert_eq!(top_emails(&records, 5).len(), 5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PriorityConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(PriorityEngine::new(config).is_err());
    }

    proptest! {
        #[test]
        fn prop_score_never_exceeds_max(
            subject in "[a-z ]{0,40}",
            content in "[a-z ]{0,40}",
            is_read in any::<bool>(),
        ) {
            let engine = PriorityEngine::default_config();
            let kw = keywords(&["a", "e", "i", "o", "u", "meeting"]);
            let r = record("p", &subject, &subject, &content, "2025-03-01T11:59:00Z", is_read);
            prop_assert!(engine.score_at(&r, &kw, now()) <= 100);
        }

        #[test]
        fn prop_prioritize_is_sorted_and_stable(scores in proptest::collection::vec(0u8..3, 0..20)) {
            let engine = PriorityEngine::default_config();
            let records: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let subject = "hit ".repeat(usize::from(*s));
                    record(&i.to_string(), &subject, "x", "", "", true)
                })
                .collect();
            let sorted = engine.prioritize_at(records, &keywords(&["hit"]), now());
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].priority >= pair[1].priority);
                if pair[0].priority == pair[1].priority {
                    let a: usize = pair[0].id.as_str().parse().unwrap();
                    let b: usize = pair[1].id.as_str().parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
