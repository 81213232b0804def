//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every crate-specific error converts into one of these four classes; the HTTP
/// layer maps the class to a status code and never needs to know the origin.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller input was rejected (missing field, malformed period, unknown company).
    ///
    /// No state has been mutated when this is returned.
    #[error("{0}")]
    Validation(String),

    /// The request was well-formed but matched no data.
    #[error("{0}")]
    NotFound(String),

    /// An external collaborator (spreadsheet API, render engine) failed.
    #[error("{0}")]
    Upstream(String),

    /// Durable state could not be read or written.
    #[error("{0}")]
    Persistence(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Stable, machine-friendly name of the error class (used in logs).
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::NotFound(_) => "not_found",
            DomainError::Upstream(_) => "upstream",
            DomainError::Persistence(_) => "persistence",
        }
    }
}
