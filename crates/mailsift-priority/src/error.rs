//! Priority engine error types

use thiserror::Error;

/// Errors that can occur while setting up scoring
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriorityError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
