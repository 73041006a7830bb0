use std::fmt;
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::vocab::{self, ldp};

/// The LDP interaction model of a resource.
///
/// A closed tag set rather than a type hierarchy: the per-model rules (which
/// models may contain children, which carry membership configuration) live in
/// the methods below and in the constraint validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionModel {
    RdfSource,
    NonRdfSource,
    Container,
    BasicContainer,
    DirectContainer,
    IndirectContainer,
}

impl InteractionModel {
    /// Every supported model, in declaration order.
    pub const ALL: [InteractionModel; 6] = [
        Self::RdfSource,
        Self::NonRdfSource,
        Self::Container,
        Self::BasicContainer,
        Self::DirectContainer,
        Self::IndirectContainer,
    ];

    /// The LDP class IRI for this model.
    pub fn iri_str(&self) -> &'static str {
        match self {
            Self::RdfSource => ldp::RDF_SOURCE,
            Self::NonRdfSource => ldp::NON_RDF_SOURCE,
            Self::Container => ldp::CONTAINER,
            Self::BasicContainer => ldp::BASIC_CONTAINER,
            Self::DirectContainer => ldp::DIRECT_CONTAINER,
            Self::IndirectContainer => ldp::INDIRECT_CONTAINER,
        }
    }

    pub fn iri(&self) -> NamedNode {
        vocab::iri(self.iri_str())
    }

    /// Resolve a model from its LDP class IRI.
    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.iri_str() == iri)
    }

    /// Whether resources of this model may contain children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Container | Self::BasicContainer | Self::DirectContainer | Self::IndirectContainer
        )
    }

    /// Whether this model contributes membership triples.
    pub fn has_membership(&self) -> bool {
        matches!(self, Self::DirectContainer | Self::IndirectContainer)
    }

    /// Whether this model's representation is RDF (as opposed to raw bytes).
    pub fn is_rdf(&self) -> bool {
        !matches!(self, Self::NonRdfSource)
    }
}

impl fmt::Display for InteractionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RdfSource => "RDFSource",
            Self::NonRdfSource => "NonRDFSource",
            Self::Container => "Container",
            Self::BasicContainer => "BasicContainer",
            Self::DirectContainer => "DirectContainer",
            Self::IndirectContainer => "IndirectContainer",
        };
        write!(f, "{name}")
    }
}

impl FromStr for InteractionModel {
    type Err = TypeError;

    /// Accepts either the full LDP class IRI or the short class name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(model) = Self::from_iri(s) {
            return Ok(model);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownInteractionModel(s.to_string()))
    }
}
