//! Error types for version history and audit projection.

use std::sync::PoisonError;

use ldp_store::StoreError;

/// Errors produced by the version log and the audit log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A TimeGate request predates the first recorded version.
    #[error("no version of {identifier} exists at or before {requested}")]
    NoVersionBefore { identifier: String, requested: String },

    /// The identifier has no recorded history at all.
    #[error("no history for {0}")]
    UnknownResource(String),

    /// Versions of one identifier must have strictly increasing datetimes.
    #[error("version of {identifier} at {at} is not after the latest ({latest})")]
    OutOfOrder {
        identifier: String,
        at: String,
        latest: String,
    },

    /// An audit activity node is missing a required triple or has too many.
    #[error("malformed activity {node}: {reason}")]
    MalformedActivity { node: String, reason: String },

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<T> From<PoisonError<T>> for LedgerError {
    fn from(e: PoisonError<T>) -> Self {
        Self::StorageFailure(format!("lock poisoned: {e}"))
    }
}

impl From<LedgerError> for StoreError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NoVersionBefore { .. } | LedgerError::UnknownResource(_) => {
                StoreError::NotFound(e.to_string())
            }
            LedgerError::OutOfOrder { .. } => StoreError::Conflict(e.to_string()),
            LedgerError::MalformedActivity { .. } | LedgerError::StorageFailure(_) => {
                StoreError::StorageFailure(e.to_string())
            }
            LedgerError::Store(inner) => inner,
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
