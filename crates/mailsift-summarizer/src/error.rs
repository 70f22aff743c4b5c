//! Error types for the Summarization Client

use thiserror::Error;

/// Errors surfaced to callers of the Summarization Client
///
/// Provider failures are not listed here: they degrade to the local
/// heuristic and are only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizerError {
    /// The text was blank after trimming
    #[error("No content provided for summarization")]
    EmptyInput,

    /// The consent gate is closed
    #[error("Summarization requires consent")]
    ConsentRequired,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
