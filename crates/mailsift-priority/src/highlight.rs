//! Highlighting projection
//!
//! Marks the top records in the document tree with a tier class and an
//! ordinal badge. This is presentation only and never feeds back into
//! scoring.

use mailsift_domain::{DocumentTreeMut, EmailRecord, NewElement, PriorityTier, Selector};
use tracing::debug;

/// Class marking a highlighted container
pub const HIGHLIGHT_CLASS: &str = "mailsift-highlighted";

pub use mailsift_domain::BADGE_CLASS;

/// What an `apply` pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightOutcome {
    /// Markers removed by the reset
    pub cleared: usize,

    /// Records marked
    pub marked: usize,

    /// Records skipped because their node is gone
    pub stale: usize,
}

/// Applies and clears highlight markers
#[derive(Debug, Clone)]
pub struct Highlighter {
    limit: usize,
    highlighted: Selector,
    badge: Selector,
}

impl Highlighter {
    /// Highlight at most `limit` records per pass
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            highlighted: Selector::class(HIGHLIGHT_CLASS),
            badge: Selector::class(BADGE_CLASS),
        }
    }

    /// Remove every marker and badge in the tree
    ///
    /// Returns how many highlighted containers and badges were removed.
    pub fn clear<T: DocumentTreeMut + ?Sized>(&self, tree: &mut T) -> usize {
        let root = tree.root();
        let marked = tree.select_all(root, &self.highlighted);
        for node in &marked {
            tree.remove_class(*node, HIGHLIGHT_CLASS);
            for tier in PriorityTier::all() {
                tree.remove_class(*node, tier.class_name());
            }
        }

        let badges = tree.select_all(root, &self.badge);
        let removed = badges
            .into_iter()
            .filter(|badge| tree.remove_node(*badge))
            .count();
        marked.len() + removed
    }

    /// Reset all markers, then mark the top positively-scored records
    ///
    /// `top` is expected in rank order. Records without a live source node are
    /// skipped but still consume their rank.
    pub fn apply<T: DocumentTreeMut + ?Sized>(&self, tree: &mut T, top: &[EmailRecord]) -> HighlightOutcome {
        let mut outcome = HighlightOutcome {
            cleared: self.clear(tree),
            ..Default::default()
        };

        let ranked = top.iter().filter(|record| record.priority > 0).take(self.limit);
        for (index, record) in ranked.enumerate() {
            let node = match record.source_ref {
                Some(node) if tree.contains(node) => node,
                _ => {
                    outcome.stale += 1;
                    continue;
                }
            };

            tree.add_class(node, HIGHLIGHT_CLASS);
            tree.add_class(node, record.tier().class_name());
            let badge = NewElement::new("div")
                .class(BADGE_CLASS)
                .attribute("title", format!("Priority Score: {}", record.priority))
                .text(format!("#{}", index + 1));
            if tree.prepend_element(node, badge).is_some() {
                outcome.marked += 1;
            } else {
                outcome.stale += 1;
            }
        }

        debug!(
            "Highlighting: cleared {}, marked {}, stale {}",
            outcome.cleared, outcome.marked, outcome.stale
        );
        outcome
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(5)
    }
}
