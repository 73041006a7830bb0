//! Triple sets and the semantic partitions they are stored under.
//!
//! A [`Graph`] is an unordered set of [`Triple`]s. A [`Dataset`] maps each
//! [`GraphName`] partition to its graph. [`Prefer`] selects which partitions
//! (and which derived views) a read yields.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use oxrdf::{NamedNode, Subject, Term, Triple};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::vocab::{ldp, trellis};

/// Semantic partition a triple belongs to.
///
/// Only `UserManaged` is externally writable. `Acl` is written through the
/// access-control path; `ServerManaged` and `Audit` are always derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphName {
    UserManaged,
    ServerManaged,
    Acl,
    Audit,
}

impl GraphName {
    pub const ALL: [GraphName; 4] = [
        Self::UserManaged,
        Self::ServerManaged,
        Self::Acl,
        Self::Audit,
    ];

    /// The Prefer IRI that names this partition.
    pub fn iri_str(&self) -> &'static str {
        match self {
            Self::UserManaged => trellis::PREFER_USER_MANAGED,
            Self::ServerManaged => trellis::PREFER_SERVER_MANAGED,
            Self::Acl => trellis::PREFER_ACCESS_CONTROL,
            Self::Audit => trellis::PREFER_AUDIT,
        }
    }

    /// Whether clients may supply triples for this partition.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::UserManaged | Self::Acl)
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iri_str())
    }
}

impl FromStr for GraphName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.iri_str() == s)
            .ok_or_else(|| TypeError::UnknownGraphName(s.to_string()))
    }
}

/// An unordered set of triples.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: HashSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert a triple. Returns `true` if it was not already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples with the given subject IRI and predicate IRI.
    pub fn matching<'a>(
        &'a self,
        subject: &'a NamedNode,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| {
            t.predicate.as_str() == predicate
                && matches!(&t.subject, Subject::NamedNode(s) if s == subject)
        })
    }

    /// Objects of triples with the given subject and predicate.
    pub fn objects<'a>(
        &'a self,
        subject: &'a NamedNode,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(subject, predicate).map(|t| &t.object)
    }

    /// IRI-valued objects of triples with the given subject and predicate.
    pub fn iri_objects(&self, subject: &NamedNode, predicate: &str) -> Vec<NamedNode> {
        self.objects(subject, predicate)
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of triples with the given subject and predicate.
    pub fn count(&self, subject: &NamedNode, predicate: &str) -> usize {
        self.matching(subject, predicate).count()
    }

    /// Canonical, sorted line form of every triple. Used for hashing.
    pub fn canonical_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.triples.iter().map(|t| format!("{t} .")).collect();
        lines.sort();
        lines
    }

    /// Triples sorted by their canonical line form.
    pub fn sorted(&self) -> Vec<Triple> {
        let mut triples: Vec<Triple> = self.triples.iter().cloned().collect();
        triples.sort_by_cached_key(|t| t.to_string());
        triples
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::hash_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

/// Triples partitioned by [`GraphName`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    graphs: BTreeMap<GraphName, Graph>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dataset holding a single user-managed graph.
    pub fn user(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut dataset = Self::new();
        dataset.extend(GraphName::UserManaged, triples);
        dataset
    }

    pub fn insert(&mut self, graph: GraphName, triple: Triple) -> bool {
        self.graphs.entry(graph).or_default().insert(triple)
    }

    pub fn extend(&mut self, graph: GraphName, triples: impl IntoIterator<Item = Triple>) {
        self.graphs.entry(graph).or_default().extend(triples);
    }

    pub fn graph(&self, name: GraphName) -> Option<&Graph> {
        self.graphs.get(&name)
    }

    /// Remove and return a partition, leaving it empty.
    pub fn take(&mut self, name: GraphName) -> Graph {
        self.graphs.remove(&name).unwrap_or_default()
    }

    pub fn graph_names(&self) -> impl Iterator<Item = GraphName> + '_ {
        self.graphs.keys().copied()
    }

    /// Total number of triples across all partitions.
    pub fn len(&self) -> usize {
        self.graphs.values().map(Graph::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (GraphName, &Triple)> {
        self.graphs
            .iter()
            .flat_map(|(name, graph)| graph.iter().map(move |t| (*name, t)))
    }
}

/// A section of a resource representation that a reader can opt into or out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Graph(GraphName),
    Containment,
    Membership,
}

impl Section {
    pub fn iri_str(&self) -> &'static str {
        match self {
            Self::Graph(g) => g.iri_str(),
            Self::Containment => ldp::PREFER_CONTAINMENT,
            Self::Membership => ldp::PREFER_MEMBERSHIP,
        }
    }

    /// Visibility when the reader expresses no preference.
    pub fn visible_by_default(&self) -> bool {
        !matches!(
            self,
            Self::Graph(GraphName::Acl) | Self::Graph(GraphName::Audit)
        )
    }
}

/// Reader preference over representation sections.
///
/// Explicit omission always wins over inclusion; sections mentioned in
/// neither set fall back to [`Section::visible_by_default`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prefer {
    include: BTreeSet<Section>,
    omit: BTreeSet<Section>,
}

impl Prefer {
    /// Include every section, including Acl and Audit.
    pub fn include_all() -> Self {
        let mut prefer = Self::default();
        for graph in GraphName::ALL {
            prefer.include.insert(Section::Graph(graph));
        }
        prefer.include.insert(Section::Containment);
        prefer.include.insert(Section::Membership);
        prefer
    }

    pub fn include(mut self, section: Section) -> Self {
        self.include.insert(section);
        self
    }

    pub fn omit(mut self, section: Section) -> Self {
        self.omit.insert(section);
        self
    }

    /// Build a preference from Prefer IRIs (unknown IRIs are ignored).
    pub fn from_iris<'a>(
        include: impl IntoIterator<Item = &'a str>,
        omit: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let lookup = |iri: &str| -> Option<Section> {
            match iri {
                ldp::PREFER_CONTAINMENT => Some(Section::Containment),
                ldp::PREFER_MEMBERSHIP => Some(Section::Membership),
                other => other.parse::<GraphName>().ok().map(Section::Graph),
            }
        };
        Self {
            include: include.into_iter().filter_map(lookup).collect(),
            omit: omit.into_iter().filter_map(lookup).collect(),
        }
    }

    pub fn wants(&self, section: Section) -> bool {
        if self.omit.contains(&section) {
            return false;
        }
        self.include.contains(&section) || section.visible_by_default()
    }
}
