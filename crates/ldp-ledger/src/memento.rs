//! Memento, TimeMap and version URI types.

use chrono::{DateTime, Utc};

use ldp_types::{vocab, BinaryMetadata, Graph, NamedNode, Resource};

/// URI of the version of `identifier` recorded at `at`.
pub fn version_uri(identifier: &NamedNode, at: &DateTime<Utc>) -> NamedNode {
    let separator = if identifier.as_str().contains('?') { '&' } else { '?' };
    vocab::iri(&format!(
        "{}{separator}version={}",
        identifier.as_str(),
        at.timestamp_micros()
    ))
}

/// What a version captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionState {
    Present(Box<Resource>),
    /// The resource was deleted at this datetime.
    Deleted,
}

/// One immutable entry in a resource's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memento {
    pub identifier: NamedNode,
    pub datetime: DateTime<Utc>,
    pub version: NamedNode,
    pub state: VersionState,
}

impl Memento {
    pub fn new(identifier: NamedNode, datetime: DateTime<Utc>, state: VersionState) -> Self {
        let version = version_uri(&identifier, &datetime);
        Self {
            identifier,
            datetime,
            version,
            state,
        }
    }

    pub fn resource(&self) -> Option<&Resource> {
        match &self.state {
            VersionState::Present(r) => Some(r),
            VersionState::Deleted => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.state, VersionState::Deleted)
    }

    /// Binary location captured by a NonRDFSource version.
    pub fn content(&self) -> Option<&BinaryMetadata> {
        self.resource().and_then(|r| r.binary.as_ref())
    }

    /// The `describedby` URI of a NonRDFSource version.
    pub fn described_by(&self) -> Option<NamedNode> {
        self.content()?;
        Some(vocab::iri(&format!("{}&ext=description", self.version.as_str())))
    }

    /// The RDF description of a NonRDFSource version: its user-managed and
    /// server-managed triples, distinct from the binary content.
    pub fn description(&self) -> Option<Graph> {
        let resource = self.resource()?;
        resource.binary.as_ref()?;
        let mut graph = resource.user.clone();
        graph.extend(resource.server_managed());
        Some(graph)
    }
}

/// A version's address within a TimeMap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MementoRef {
    pub version: NamedNode,
    pub datetime: DateTime<Utc>,
}

impl From<&Memento> for MementoRef {
    fn from(m: &Memento) -> Self {
        Self {
            version: m.version.clone(),
            datetime: m.datetime,
        }
    }
}

/// Ordered list of every version of a resource, with its temporal bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeMap {
    pub identifier: NamedNode,
    pub mementos: Vec<MementoRef>,
}

impl TimeMap {
    pub fn len(&self) -> usize {
        self.mementos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mementos.is_empty()
    }

    /// Datetime of the earliest version.
    pub fn has_beginning(&self) -> Option<DateTime<Utc>> {
        self.mementos.first().map(|m| m.datetime)
    }

    /// Datetime of the latest version.
    pub fn has_end(&self) -> Option<DateTime<Utc>> {
        self.mementos.last().map(|m| m.datetime)
    }
}
