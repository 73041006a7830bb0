use uuid::Uuid;

/// Supplies fresh, collision-free resource identifiers.
///
/// Identifiers are UUID v7 strings (time-ordered with random tail), optionally
/// prefixed. The supplier holds no shared counter, so concurrent callers never
/// contend.
#[derive(Clone, Debug, Default)]
pub struct IdentifierSupplier {
    prefix: String,
}

impl IdentifierSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn generate(&self) -> String {
        format!("{}{}", self.prefix, Uuid::now_v7())
    }
}
