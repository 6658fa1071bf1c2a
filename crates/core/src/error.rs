//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is reported synchronously to the caller. Nothing in this
/// workspace retries on its own; retry policy belongs to whoever orchestrates
/// pricing or catalog reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A lookup did not match anything.
    #[error("not found: {0}")]
    NotFound(String),

    /// A lookup that must yield a single record matched more than one.
    #[error("ambiguous result: {0}")]
    AmbiguousResult(String),

    /// A second adjustment was applied for an offer that cannot stack.
    #[error("offer {0} is not stackable and already has an adjustment on this order")]
    DuplicateNonStackableOffer(String),

    /// Removal of a record that is not held by the ledger.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// An adjustment failed validation or would break the ledger policy.
    #[error("invalid adjustment: {0}")]
    InvalidAdjustment(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A persistence collaborator reported a failure.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::AmbiguousResult(msg.into())
    }

    pub fn duplicate_offer(offer: impl core::fmt::Display) -> Self {
        Self::DuplicateNonStackableOffer(offer.to_string())
    }

    pub fn record_not_found(msg: impl Into<String>) -> Self {
        Self::RecordNotFound(msg.into())
    }

    pub fn invalid_adjustment(msg: impl Into<String>) -> Self {
        Self::InvalidAdjustment(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
