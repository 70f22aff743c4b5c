//! MailSift Priority Engine
//!
//! Scores records against the user's keywords, ranks them, and projects the
//! ranking onto the document tree as highlight markers.
//!
//! The engine provides:
//! - Additive keyword scoring (subject, sender, content) with unread and
//!   recency bonuses, clamped to 100
//! - Stable ranking (ties keep input order)
//! - Top-K selection of positively scored records
//! - Optional highlighting with tier classes and ordinal badges
//!
//! # Examples
//!
//! ```
//! use mailsift_domain::{EmailRecord, KeywordSet};
//! use mailsift_priority::PriorityEngine;
//!
//! let engine = PriorityEngine::default_config();
//! let keywords = KeywordSet::defaults();
//! let records = vec![
//!     EmailRecord::new("a", "Lunch", "Bob", "", "", true),
//!     EmailRecord::new("b", "Deadline moved", "Alice", "", "", true),
//! ];
//!
//! let ranked = engine.prioritize(records, &keywords);
//! let top = engine.top_emails(&ranked);
//! assert_eq!(top.len(), 1);
//! assert_eq!(top[0].id.as_str(), "b");
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod highlight;

pub use config::PriorityConfig;
pub use engine::{top_emails, PriorityEngine};
pub use error::PriorityError;
pub use highlight::{HighlightOutcome, Highlighter, BADGE_CLASS, HIGHLIGHT_CLASS};
