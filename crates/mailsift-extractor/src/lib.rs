//! MailSift Extractor
//!
//! Reads inbox entries out of a document tree and watches it for changes.
//!
//! # Overview
//!
//! The Record Extractor enumerates every record container a provider profile
//! locates, in document order, and turns each into an [`EmailRecord`]. The
//! Mutation Watcher collapses bursts of tree changes into single events and
//! handles inboxes that load after the page does.
//!
//! # Architecture
//!
//! ```text
//! DocumentTree → RecordExtractor → Vec<EmailRecord> → Priority Engine
//!      ↓
//! TreeChange stream → MutationWatcher → ChangeBatch → Orchestrator
//! ```
//!
//! # Example Usage
//!
//! ```
//! use mailsift_extractor::{ExtractorConfig, NodeSpec, RecordExtractor, SnapshotTree};
//!
//! let tree = SnapshotTree::from_spec(
//!     NodeSpec::element("div").attr("role", "main").child(
//!         NodeSpec::element("tr")
//!             .class("zA")
//!             .attr("data-thread-perm-id", "thread-1")
//!             .child(NodeSpec::element("span").class("yX").class("xY").text("Alice"))
//!             .child(NodeSpec::element("span").class("bog").text("Quarterly budget")),
//!     ),
//! );
//!
//! let extractor = RecordExtractor::for_url(
//!     "https://mail.google.com/mail/u/0/#inbox",
//!     ExtractorConfig::default(),
//! )
//! .unwrap();
//! let records = extractor.extract(&tree);
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].id.as_str(), "thread-1");
//! assert_eq!(records[0].subject, "Quarterly budget");
//! assert_eq!(records[0].sender, "Alice");
//! ```
//!
//! [`EmailRecord`]: mailsift_domain::EmailRecord

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod identity;
mod snapshot;
mod watcher;


pub use config::{ExtractorConfig, WatcherConfig};
pub use error::{ExtractionNodeError, ExtractorError};
pub use extractor::{ExtractionReport, RecordExtractor};
pub use identity::{collapse_whitespace, derive_id, IdAllocator, IDENTITY_ATTRIBUTES};
pub use snapshot::{NodeSpec, SnapshotTree};
pub use watcher::{ChangeBatch, InitialExtraction, MutationWatcher};
