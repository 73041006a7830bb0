use ldp_store::StoreError;

/// Configuration problems detected when a service is built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("default agent {iri:?} is not an absolute IRI: {reason}")]
    InvalidAgent { iri: String, reason: String },

    #[error("lock_prune_threshold must be at least 1")]
    InvalidPruneThreshold,
}

/// Errors from building a [`crate::ResourceService`].
///
/// Operations on a running service report [`StoreError`] directly.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
