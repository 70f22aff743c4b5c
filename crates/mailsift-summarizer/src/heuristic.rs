//! Local heuristic summarizer
//!
//! Deterministic stand-in used whenever the remote provider is unavailable.
//! The same input always yields the same non-empty summary.

/// Returned when no text survives sanitization
pub const PLACEHOLDER_SUMMARY: &str = "Email content available for summarization.";

/// Words that mark a sentence as worth surfacing
pub const URGENCY_WORDS: &[&str] = &[
    "urgent",
    "important",
    "meeting",
    "deadline",
    "action",
    "required",
    "please",
    "need",
    "update",
    "review",
    "confirm",
];

const MIN_SENTENCE_CHARS: usize = 10;
const FALLBACK_WORDS: usize = 10;
const FALLBACK_ELLIPSIS_AFTER: usize = 50;
const ELLIPSIS: &str = "...";

/// Sentences of at least ten characters, trimmed
fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

fn is_urgent(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    URGENCY_WORDS.iter().any(|word| lower.contains(word))
}

/// Cut to `max_chars`, ending in an ellipsis when anything was dropped
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Summarize already-sanitized text
///
/// Picks the first sentence containing an urgency word, else the first
/// sentence, else the leading words.
pub fn heuristic_summary(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return PLACEHOLDER_SUMMARY.to_string();
    }

    let candidates = sentences(text);
    let summary = match candidates.iter().find(|s| is_urgent(s)).or(candidates.first()) {
        Some(sentence) => format!("{}.", sentence),
        None => {
            let mut words = text.split_whitespace().take(FALLBACK_WORDS).collect::<Vec<_>>().join(" ");
            if text.chars().count() > FALLBACK_ELLIPSIS_AFTER {
                words.push_str(ELLIPSIS);
            }
            words
        }
    };

    if summary.is_empty() {
        return PLACEHOLDER_SUMMARY.to_string();
    }
    truncate_with_ellipsis(&summary, max_chars)
}
