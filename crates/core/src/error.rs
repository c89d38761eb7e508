//! Error types for docchat.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM, retrieval, prompt, and the
//! three failure kinds of a chat turn (chain failure, empty chain result,
//! no relevant documents).

use thiserror::Error;

/// Unified error type for docchat.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Every variant is terminal for the current chat turn; nothing is retried.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retriever and document index errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The retrieval chain failed while being invoked
    #[error("An error occurred while running the answer chain: {0}")]
    Chain(String),

    /// The retrieval chain completed but produced no result at all
    #[error("The answer chain returned no result.")]
    EmptyChainResult,

    /// The retrieval chain found no context documents for the question
    #[error(
        "No relevant documents were found. The documents may not be loaded, \
         or none of them matches the question."
    )]
    NoRelevantDocuments,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
