//! Error types for the Orchestrator

use crate::store::StoreError;
use mailsift_summarizer::SummarizerError;
use thiserror::Error;

/// Errors that can occur while driving the pipeline
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Settings store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Summarization was refused
    #[error("Summarization error: {0}")]
    Summarizer(#[from] SummarizerError),

    /// Summarization is switched off in the user's settings
    #[error("Summarization is disabled")]
    SummarizationDisabled,

    /// No record with this id in the last cycle
    #[error("Unknown record: {0}")]
    UnknownRecord(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
