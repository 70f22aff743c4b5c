//! Core Record Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::{ExtractionNodeError, ExtractorError};
use crate::identity::{collapse_whitespace, derive_id, IdAllocator};
use chrono::{DateTime, SecondsFormat, Utc};
use mailsift_domain::{
    DocumentTree, EmailRecord, NodeId, Provider, ProviderProfile, Selector, BADGE_CLASS,
    DEFAULT_SENDER, DEFAULT_SUBJECT,
};
use tracing::{debug, warn};

/// Outcome of one extraction pass
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Records in document order
    pub records: Vec<EmailRecord>,

    /// Containers matched by the profile
    pub containers: usize,

    /// Containers dropped for lacking both subject and sender
    pub discarded: usize,

    /// Containers that failed to read
    pub failures: Vec<ExtractionNodeError>,
}

impl ExtractionReport {
    /// Containers were found but every one of them failed
    pub fn is_total_failure(&self) -> bool {
        self.containers > 0 && self.failures.len() == self.containers
    }
}

/// Reads [`EmailRecord`]s out of a document tree using a provider profile
///
/// Extraction never writes to the tree and never fails as a whole: a node that
/// cannot be read is skipped and reported. Presentation subtrees (badges) are
/// invisible to it, so highlighting never changes what is extracted.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    profile: ProviderProfile,
    config: ExtractorConfig,
    presentation: Selector,
}

impl RecordExtractor {
    /// Create an extractor for a validated profile
    pub fn new(profile: ProviderProfile, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            profile,
            config,
            presentation: Selector::class(BADGE_CLASS),
        })
    }

    /// Detect the provider from a page URL and build its extractor
    pub fn for_url(url: &str, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        let provider = Provider::detect(url)
            .ok_or_else(|| ExtractorError::UnsupportedPage(url.to_string()))?;
        Self::new(provider.profile()?, config)
    }

    /// Profile in use
    pub fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    /// Provider in use
    pub fn provider(&self) -> Provider {
        self.profile.provider
    }

    /// Extract records, defaulting missing timestamps to the current time
    pub fn extract<T: DocumentTree + ?Sized>(&self, tree: &T) -> Vec<EmailRecord> {
        self.extract_at(tree, Utc::now())
    }

    /// Extract records, defaulting missing timestamps to `now`
    pub fn extract_at<T: DocumentTree + ?Sized>(&self, tree: &T, now: DateTime<Utc>) -> Vec<EmailRecord> {
        self.report(tree, now).records
    }

    /// Extract records and describe what was skipped
    pub fn report<T: DocumentTree + ?Sized>(&self, tree: &T, now: DateTime<Utc>) -> ExtractionReport {
        let scope = self.scope(tree);
        let containers = tree.select_all(scope, &self.profile.locators.container);
        let default_timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut report = ExtractionReport {
            containers: containers.len(),
            ..Default::default()
        };
        let mut ids = IdAllocator::new();

        for node in containers {
            match self.extract_node(tree, node, &default_timestamp) {
                Ok(Some(record)) => {
                    let id = ids.allocate(record.id.clone());
                    report.records.push(EmailRecord { id, ..record });
                }
                Ok(None) => {
                    debug!("Discarding container {:?}: no subject or sender", node);
                    report.discarded += 1;
                }
                Err(e) => {
                    warn!("Skipping container: {}", e);
                    report.failures.push(e);
                }
            }
        }

        debug!(
            "Extracted {} records from {} containers ({} discarded, {} failed) on {}",
            report.records.len(),
            report.containers,
            report.discarded,
            report.failures.len(),
            self.profile.provider
        );
        report
    }

    /// Inbox root if it matches, else the whole document
    fn scope<T: DocumentTree + ?Sized>(&self, tree: &T) -> NodeId {
        if self.config.scope_to_inbox {
            if let Some(inbox) = tree.select_first(tree.root(), &self.profile.locators.inbox) {
                return inbox;
            }
        }
        tree.root()
    }

    fn extract_node<T: DocumentTree + ?Sized>(
        &self,
        tree: &T,
        node: NodeId,
        default_timestamp: &str,
    ) -> Result<Option<EmailRecord>, ExtractionNodeError> {
        if !tree.contains(node) {
            return Err(ExtractionNodeError::Detached(node));
        }
        let locators = &self.profile.locators;
        let skip = &self.presentation;

        let subject = first_text(tree, node, &locators.subject, skip);
        let sender = first_text(tree, node, &locators.sender, skip);
        if subject.is_none() && sender.is_none() {
            return Ok(None);
        }
        let content = first_text(tree, node, &locators.content, skip).unwrap_or_default();
        let timestamp = first_text(tree, node, &locators.timestamp, skip)
            .unwrap_or_else(|| default_timestamp.to_string());
        let is_read = !is_unread(tree, node, &locators.unread, skip);

        let id = derive_id(tree, node, self.config.fingerprint_chars, skip);
        let record = EmailRecord::new(
            id,
            subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            sender.unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            content,
            timestamp,
            is_read,
        )
        .with_source(node);
        Ok(Some(record))
    }
}

/// Text of the first candidate yielding something non-empty
///
/// A candidate's text is its flattened text content, else its `title`.
fn first_text<T: DocumentTree + ?Sized>(
    tree: &T,
    scope: NodeId,
    candidates: &[Selector],
    skip: &Selector,
) -> Option<String> {
    candidates.iter().find_map(|selector| {
        let found = tree.select_first_excluding(scope, selector, skip)?;
        let text = collapse_whitespace(&tree.text_content_excluding(found, skip));
        if !text.is_empty() {
            return Some(text);
        }
        tree.attribute(found, "title")
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
    })
}

/// An explicit unread indicator on the container or inside it means unread
fn is_unread<T: DocumentTree + ?Sized>(tree: &T, node: NodeId, indicators: &[Selector], skip: &Selector) -> bool {
    indicators.iter().any(|selector| {
        tree.matches(node, selector) || tree.select_first_excluding(node, selector, skip).is_some()
    })
}
