use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid IRI: {0}")]
    InvalidIri(String),

    #[error("unknown interaction model: {0}")]
    UnknownInteractionModel(String),

    #[error("unknown graph name: {0}")]
    UnknownGraphName(String),
}
