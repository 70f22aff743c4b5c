//! Content fingerprints
//!
//! A fast, collision-tolerant hash of text. Used as the summary cache key and as
//! the last-resort record identity. Not cryptographic.

use std::fmt;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a fingerprint of a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint the full text
    ///
    /// # Examples
    ///
    /// ```
    /// use mailsift_domain::Fingerprint;
    ///
    /// assert_eq!(Fingerprint::of("hello"), Fingerprint::of("hello"));
    /// assert_ne!(Fingerprint::of("hello"), Fingerprint::of("hello!"));
    /// ```
    pub fn of(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Fingerprint only the first `max_chars` characters of the text
    pub fn of_prefix(text: &str, max_chars: usize) -> Self {
        let end = text
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        Self::of_bytes(&text.as_bytes()[..end])
    }

    fn of_bytes(bytes: &[u8]) -> Self {
        let mut hash = FNV_OFFSET_BASIS;
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self(hash)
    }

    /// Raw hash value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
