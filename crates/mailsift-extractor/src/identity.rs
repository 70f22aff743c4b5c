//! Record identity derivation
//!
//! Identity is derived from observable element state only, never from node
//! handles, so re-extracting an unchanged tree yields the same ids.

use mailsift_domain::{DocumentTree, Fingerprint, NodeId, RecordId, Selector};
use std::collections::HashMap;

/// Attributes consulted after the element id, in priority order
///
/// Excludes `data-test-id`, which some providers set to a per-list constant
/// (`message-list-item`).
pub const IDENTITY_ATTRIBUTES: &[&str] = &[
    "data-thread-perm-id",
    "data-legacy-thread-id",
    "data-message-id",
];

/// Collapse runs of whitespace to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive the base identity of a container
///
/// The fingerprint fallback hashes the container's text without the subtrees
/// matching `skip`.
pub fn derive_id<T: DocumentTree + ?Sized>(
    tree: &T,
    node: NodeId,
    fingerprint_chars: usize,
    skip: &Selector,
) -> RecordId {
    let explicit = std::iter::once("id")
        .chain(IDENTITY_ATTRIBUTES.iter().copied())
        .filter_map(|name| tree.attribute(node, name))
        .map(str::trim)
        .find(|value| !value.is_empty());

    match explicit {
        Some(value) => RecordId::new(value),
        None => {
            let text = collapse_whitespace(&tree.text_content_excluding(node, skip));
            let fingerprint = Fingerprint::of_prefix(&text, fingerprint_chars);
            RecordId::new(format!("fp-{}", fingerprint))
        }
    }
}

/// Hands out unique ids within one extraction pass
///
/// The first occurrence of a base id keeps it; later occurrences get a `#n`
/// ordinal suffix in document order.
#[derive(Debug, Default)]
pub struct IdAllocator {
    seen: HashMap<RecordId, usize>,
}

impl IdAllocator {
    /// Fresh allocator for one pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `base` unique within this pass
    pub fn allocate(&mut self, base: RecordId) -> RecordId {
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            RecordId::new(format!("{}#{}", base, count))
        }
    }
}
