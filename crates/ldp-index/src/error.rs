//! Error types for the derived indexes.

use std::sync::PoisonError;

use ldp_store::StoreError;

/// Errors from index maintenance and membership resolution.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A child may be contained by at most one container.
    #[error("{child} is already contained by {container}")]
    AlreadyContained { child: String, container: String },

    #[error("index lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<T> From<PoisonError<T>> for IndexError {
    fn from(e: PoisonError<T>) -> Self {
        Self::Poisoned(e.to_string())
    }
}

impl From<IndexError> for StoreError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::AlreadyContained { .. } => StoreError::Conflict(e.to_string()),
            IndexError::Poisoned(msg) => StoreError::StorageFailure(msg),
            IndexError::Store(inner) => inner,
        }
    }
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
