use std::fmt;

use oxrdf::{NamedNode, Triple};

use crate::vocab::{self, trellis};

/// Which structural rule a write violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Container membership metadata violates a 0/1 cardinality rule.
    InvalidCardinality,
    /// An object does not have the type its predicate requires.
    InvalidRange,
    /// A server-managed property appears in a user-managed graph.
    InvalidProperty,
}

impl ConstraintKind {
    pub fn iri_str(&self) -> &'static str {
        match self {
            Self::InvalidCardinality => trellis::INVALID_CARDINALITY,
            Self::InvalidRange => trellis::INVALID_RANGE,
            Self::InvalidProperty => trellis::INVALID_PROPERTY,
        }
    }
}

/// A structured validation failure naming the offending constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    /// The triples that triggered the violation (may be empty for
    /// "missing triple" failures).
    pub triples: Vec<Triple>,
    pub message: String,
}

impl ConstraintViolation {
    pub fn new(kind: ConstraintKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            triples: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_triples(mut self, triples: impl IntoIterator<Item = Triple>) -> Self {
        self.triples.extend(triples);
        self
    }

    /// The constraint IRI surfaced to clients.
    pub fn constraint(&self) -> NamedNode {
        vocab::iri(self.kind.iri_str())
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>: {}", self.kind.iri_str(), self.message)
    }
}

impl std::error::Error for ConstraintViolation {}
