//! MailSift Domain Layer
//!
//! This crate contains the core types and trait seams for MailSift. Apart from
//! `chrono` (used for ISO-8601 timestamps) it has no external dependencies, and
//! it defines the concepts every other layer builds on.
//!
//! ## Key Concepts
//!
//! - **EmailRecord**: One inbox entry as seen at extraction time
//! - **KeywordSet**: User keywords, matched case-insensitively
//! - **Settings**: Feature toggles read on every cycle
//! - **PriorityTier**: Coarse presentation bucket (0-4) derived from a score
//! - **Provider Profile**: Per-service locators and URL predicates
//! - **Document tree**: The externally mutating tree records are read from
//!
//! ## Architecture
//!
//! - Pure domain logic only
//! - Infrastructure implementations (trees, providers, stores) live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod consent;
pub mod fingerprint;
pub mod keywords;
pub mod profile;
pub mod record;
pub mod selector;
pub mod settings;
pub mod tier;
pub mod traits;
pub mod tree;

// Re-exports for convenience
pub use consent::ConsentGate;
pub use fingerprint::Fingerprint;
pub use keywords::{KeywordError, KeywordSet, MAX_KEYWORD_LENGTH};
pub use profile::{Locators, ProfileError, Provider, ProviderProfile};
pub use record::{parse_timestamp, EmailRecord, RecordId, DEFAULT_SENDER, DEFAULT_SUBJECT};
pub use selector::{Selector, SelectorError};
pub use settings::{Settings, SettingsPatch};
pub use tier::PriorityTier;
pub use traits::{SummaryRequest, SummaryResponse, SummaryService};
pub use tree::{DocumentTree, DocumentTreeMut, NewElement, NodeId, TreeChange, BADGE_CLASS};
