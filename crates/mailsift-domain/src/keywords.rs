//! Keyword set module - user keywords with case-insensitive matching

use std::error::Error;
use std::fmt;

/// Maximum keyword length in characters
pub const MAX_KEYWORD_LENGTH: usize = 50;

/// Reasons a keyword is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordError {
    /// Blank after trimming
    Empty,

    /// Longer than [`MAX_KEYWORD_LENGTH`] characters
    TooLong {
        /// Length of the rejected keyword in characters
        length: usize,
    },

    /// Already present (compared case-insensitively)
    Duplicate(String),
}

impl fmt::Display for KeywordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordError::Empty => write!(f, "Please enter a keyword"),
            KeywordError::TooLong { length } => write!(
                f,
                "Keyword is too long ({} characters, max {})",
                length, MAX_KEYWORD_LENGTH
            ),
            KeywordError::Duplicate(keyword) => write!(f, "Keyword already exists: {}", keyword),
        }
    }
}

impl Error for KeywordError {}

/// Ordered set of keywords
///
/// Insertion order is preserved. Duplicates are detected case-insensitively.
///
/// # Examples
///
/// ```
/// use mailsift_domain::KeywordSet;
///
/// let mut keywords = KeywordSet::new();
/// keywords.try_insert("Urgent").unwrap();
/// assert!(keywords.try_insert("urgent").is_err());
/// assert!(keywords.contains("URGENT"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
    // Lowercased mirror of `keywords`, same order
    folded: Vec<String>,
}

impl KeywordSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Keywords a fresh install starts with
    pub fn defaults() -> Self {
        Self::from_lossy(["urgent", "important", "meeting", "deadline"]).0
    }

    /// Build from untrusted input, skipping invalid entries
    ///
    /// Returns the set and the rejected entries with their reasons.
    pub fn from_lossy<I, S>(items: I) -> (Self, Vec<(String, KeywordError)>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        let mut rejected = Vec::new();
        for item in items {
            if let Err(e) = set.try_insert(item.as_ref()) {
                rejected.push((item.as_ref().to_string(), e));
            }
        }
        (set, rejected)
    }

    /// Insert a keyword after trimming it
    pub fn try_insert(&mut self, keyword: &str) -> Result<(), KeywordError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(KeywordError::Empty);
        }
        let length = keyword.chars().count();
        if length > MAX_KEYWORD_LENGTH {
            return Err(KeywordError::TooLong { length });
        }
        let folded = keyword.to_lowercase();
        if self.folded.contains(&folded) {
            return Err(KeywordError::Duplicate(keyword.to_string()));
        }
        self.keywords.push(keyword.to_string());
        self.folded.push(folded);
        Ok(())
    }

    /// Remove a keyword (case-insensitive). Returns whether it was present.
    pub fn remove(&mut self, keyword: &str) -> bool {
        let folded = keyword.trim().to_lowercase();
        match self.folded.iter().position(|k| *k == folded) {
            Some(idx) => {
                self.folded.remove(idx);
                self.keywords.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Case-insensitive membership test
    pub fn contains(&self, keyword: &str) -> bool {
        self.folded.contains(&keyword.trim().to_lowercase())
    }

    /// Keywords as entered, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Lowercased keywords, in insertion order
    pub fn folded(&self) -> impl Iterator<Item = &str> {
        self.folded.iter().map(String::as_str)
    }

    /// Number of keywords
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords as owned strings (for persistence)
    pub fn to_vec(&self) -> Vec<String> {
        self.keywords.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_trims() {
        let mut set = KeywordSet::new();
        set.try_insert("  budget  ").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["budget"]);
    }

    #[test]
    fn test_rejects_empty_and_long() {
        let mut set = KeywordSet::new();
        assert_eq!(set.try_insert("   "), Err(KeywordError::Empty));
        let long = "x".repeat(MAX_KEYWORD_LENGTH + 1);
        assert_eq!(
            set.try_insert(&long),
            Err(KeywordError::TooLong { length: MAX_KEYWORD_LENGTH + 1 })
        );
        assert!(set.try_insert(&"x".repeat(MAX_KEYWORD_LENGTH)).is_ok());
    }

    #[test]
    fn test_case_insensitive_duplicates() {
        let mut set = KeywordSet::new();
        set.try_insert("Invoice").unwrap();
        assert!(matches!(set.try_insert("INVOICE"), Err(KeywordError::Duplicate(_))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order() {
        let (mut set, rejected) = KeywordSet::from_lossy(["a1", "b2", "c3"]);
        assert!(rejected.is_empty());
        assert!(set.remove("B2"));
        assert!(!set.remove("b2"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a1", "c3"]);
        assert_eq!(set.folded().collect::<Vec<_>>(), vec!["a1", "c3"]);
    }

    #[test]
    fn test_from_lossy_reports_rejections() {
        let (set, rejected) = KeywordSet::from_lossy(["urgent", "", "Urgent"]);
        assert_eq!(set.len(), 1);
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_defaults() {
        let set = KeywordSet::defaults();
        assert_eq!(set.len(), 4);
        assert!(set.contains("deadline"));
    }

    proptest! {
        #[test]
        fn prop_no_case_insensitive_duplicates(items in proptest::collection::vec("[a-zA-Z]{1,8}", 0..20)) {
            let (set, _) = KeywordSet::from_lossy(&items);
            let mut folded: Vec<_> = set.folded().map(str::to_string).collect();
            let before = folded.len();
            folded.sort();
            folded.dedup();
            prop_assert_eq!(before, folded.len());
        }
    }
}
