//! Error types for the quad store and the resource service facade.

use std::sync::PoisonError;

use ldp_types::{ConstraintKind, ConstraintViolation};

/// Errors surfaced by the store and, unchanged, by the resource service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Container membership metadata violates a 0/1 cardinality rule.
    #[error("invalid cardinality: {0}")]
    InvalidCardinality(ConstraintViolation),

    /// An object violates the range its predicate requires.
    #[error("invalid range: {0}")]
    InvalidRange(ConstraintViolation),

    /// A server-managed property was supplied by the client.
    #[error("invalid property: {0}")]
    InvalidProperty(ConstraintViolation),

    /// Identifier already exists, or a precondition did not hold.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The target is missing or deleted where existence was required.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying persistence is unavailable. Always retryable.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }

    /// The constraint violation carried by validation failures.
    pub fn violation(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::InvalidCardinality(v) | Self::InvalidRange(v) | Self::InvalidProperty(v) => {
                Some(v)
            }
            _ => None,
        }
    }
}

impl From<ConstraintViolation> for StoreError {
    fn from(violation: ConstraintViolation) -> Self {
        match violation.kind {
            ConstraintKind::InvalidCardinality => Self::InvalidCardinality(violation),
            ConstraintKind::InvalidRange => Self::InvalidRange(violation),
            ConstraintKind::InvalidProperty => Self::InvalidProperty(violation),
        }
    }
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(e: PoisonError<T>) -> Self {
        Self::StorageFailure(format!("lock poisoned: {e}"))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
