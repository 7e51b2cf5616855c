//! Error types for triage.

use thiserror::Error;

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for triage operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A criterion id was not found in the live criterion set.
    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),

    /// A column name was not found in the table header.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Mapping validation failed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A persisted configuration cannot be applied to the loaded table.
    #[error("Incompatible configuration: {0}")]
    Incompatible(String),

    /// Serialization error for persisted records and export payloads.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an unknown criterion error.
    pub fn unknown_criterion(id: impl Into<String>) -> Self {
        Error::UnknownCriterion(id.into())
    }

    /// Create an unknown column error.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Error::UnknownColumn(name.into())
    }

    /// Create an incompatible configuration error.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Error::Incompatible(msg.into())
    }
}
