//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] mailsift_extractor::ExtractorError),

    /// Pipeline error
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] mailsift_orchestrator::OrchestratorError),

    /// Summarization refused
    #[error("Summarizer error: {0}")]
    Summarizer(#[from] mailsift_summarizer::SummarizerError),

    /// Provider setup error
    #[error("Provider error: {0}")]
    Provider(#[from] mailsift_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
