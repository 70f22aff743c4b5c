//! Error types for the Extractor

use mailsift_domain::{NodeId, ProfileError};
use thiserror::Error;

/// Errors that can occur while setting up or feeding extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// No supported provider serves this URL
    #[error("Unsupported page: {0}")]
    UnsupportedPage(String),

    /// A built-in provider profile failed validation
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Snapshot JSON could not be parsed
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Snapshot is structurally unusable
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

/// Failure reading a single record container
///
/// Caught per node and never surfaced beyond the extraction report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionNodeError {
    /// The container was removed from the tree mid-pass
    #[error("Container {0:?} is no longer in the tree")]
    Detached(NodeId),
}
