//! Resource state, lookup outcomes and membership configuration.

use chrono::{DateTime, SecondsFormat, Utc};
use oxrdf::{Literal, NamedNode, Triple};
use serde::{Deserialize, Serialize};

use crate::etag::{EntityTag, TagHasher};
use crate::graph::{Graph, GraphName, Prefer, Section};
use crate::model::InteractionModel;
use crate::vocab::{self, dc, ldp, rdf};

/// Metadata of the bytes behind a NonRDFSource.
///
/// `identifier` is the opaque binary location understood by the binary
/// service; it is not a resource identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryMetadata {
    pub identifier: String,
    pub mime_type: String,
}

impl BinaryMetadata {
    pub fn new(identifier: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Direction of the membership predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberRelation {
    /// `(membershipResource, R, member)`
    HasMember(NamedNode),
    /// `(member, R, membershipResource)`
    IsMemberOf(NamedNode),
}

impl MemberRelation {
    pub fn predicate(&self) -> &NamedNode {
        match self {
            Self::HasMember(p) | Self::IsMemberOf(p) => p,
        }
    }
}

/// Membership configuration of a Direct or Indirect container.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MembershipConfig {
    pub membership_resource: NamedNode,
    pub relation: MemberRelation,
    pub inserted_content_relation: NamedNode,
}

impl MembershipConfig {
    /// Read the configuration from a container's user-managed graph.
    ///
    /// Returns `None` for models without membership or when the graph lacks a
    /// membership resource or member relation. Cardinality is not checked
    /// here; the constraint validator rejects ambiguous graphs before this
    /// runs. A missing `insertedContentRelation` defaults to
    /// `ldp:MemberSubject`.
    pub fn from_graph(
        identifier: &NamedNode,
        model: InteractionModel,
        graph: &Graph,
    ) -> Option<Self> {
        if !model.has_membership() {
            return None;
        }
        let membership_resource = graph
            .iri_objects(identifier, ldp::MEMBERSHIP_RESOURCE)
            .into_iter()
            .next()?;
        let relation = match graph
            .iri_objects(identifier, ldp::HAS_MEMBER_RELATION)
            .into_iter()
            .next()
        {
            Some(p) => MemberRelation::HasMember(p),
            None => MemberRelation::IsMemberOf(
                graph
                    .iri_objects(identifier, ldp::IS_MEMBER_OF_RELATION)
                    .into_iter()
                    .next()?,
            ),
        };
        let inserted_content_relation = graph
            .iri_objects(identifier, ldp::INSERTED_CONTENT_RELATION)
            .into_iter()
            .next()
            .unwrap_or_else(|| vocab::iri(ldp::MEMBER_SUBJECT));
        Some(Self {
            membership_resource,
            relation,
            inserted_content_relation,
        })
    }

    /// Whether members are the child resources themselves.
    pub fn uses_member_subject(&self) -> bool {
        self.inserted_content_relation.as_str() == ldp::MEMBER_SUBJECT
    }
}

/// The current state of a resource, with derived views merged in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub identifier: NamedNode,
    pub interaction_model: InteractionModel,
    /// The containing resource; `None` for the root.
    pub container: Option<NamedNode>,
    /// Present only for Direct/Indirect containers.
    pub membership: Option<MembershipConfig>,
    /// Present iff the model is NonRDFSource.
    pub binary: Option<BinaryMetadata>,
    pub modified: DateTime<Utc>,
    pub user: Graph,
    pub acl: Graph,
    pub audit: Graph,
    /// Derived `ldp:contains` triples.
    pub containment: Graph,
    /// Derived membership triples that live on this resource.
    pub membership_triples: Graph,
}

impl Resource {
    pub fn membership_resource(&self) -> Option<&NamedNode> {
        self.membership.as_ref().map(|m| &m.membership_resource)
    }

    pub fn member_relation(&self) -> Option<&NamedNode> {
        match self.membership.as_ref().map(|m| &m.relation) {
            Some(MemberRelation::HasMember(p)) => Some(p),
            _ => None,
        }
    }

    pub fn member_of_relation(&self) -> Option<&NamedNode> {
        match self.membership.as_ref().map(|m| &m.relation) {
            Some(MemberRelation::IsMemberOf(p)) => Some(p),
            _ => None,
        }
    }

    pub fn inserted_content_relation(&self) -> Option<&NamedNode> {
        self.membership
            .as_ref()
            .map(|m| &m.inserted_content_relation)
    }

    pub fn has_acl(&self) -> bool {
        !self.acl.is_empty()
    }

    /// Server-managed triples derived from the resource's own metadata.
    pub fn server_managed(&self) -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            self.identifier.clone(),
            vocab::iri(rdf::TYPE),
            self.interaction_model.iri(),
        ));
        if let Some(parent) = &self.container {
            graph.insert(Triple::new(
                self.identifier.clone(),
                vocab::iri(dc::IS_PART_OF),
                parent.clone(),
            ));
        }
        if let Some(binary) = &self.binary {
            graph.insert(Triple::new(
                self.identifier.clone(),
                vocab::iri(dc::HAS_PART),
                Literal::new_simple_literal(binary.identifier.clone()),
            ));
            graph.insert(Triple::new(
                self.identifier.clone(),
                vocab::iri(dc::FORMAT),
                Literal::new_simple_literal(binary.mime_type.clone()),
            ));
        }
        graph
    }

    /// The representation as `(partition, triple)` pairs, filtered by `prefer`.
    ///
    /// Containment and membership triples are reported under
    /// [`GraphName::ServerManaged`] but are governed by their own sections.
    pub fn stream(&self, prefer: &Prefer) -> Vec<(GraphName, Triple)> {
        let mut out = Vec::new();
        let mut push = |name: GraphName, graph: &Graph| {
            out.extend(graph.sorted().into_iter().map(|t| (name, t)));
        };
        if prefer.wants(Section::Graph(GraphName::UserManaged)) {
            push(GraphName::UserManaged, &self.user);
        }
        if prefer.wants(Section::Graph(GraphName::ServerManaged)) {
            push(GraphName::ServerManaged, &self.server_managed());
        }
        if prefer.wants(Section::Containment) {
            push(GraphName::ServerManaged, &self.containment);
        }
        if prefer.wants(Section::Membership) {
            push(GraphName::ServerManaged, &self.membership_triples);
        }
        if prefer.wants(Section::Graph(GraphName::Acl)) {
            push(GraphName::Acl, &self.acl);
        }
        if prefer.wants(Section::Graph(GraphName::Audit)) {
            push(GraphName::Audit, &self.audit);
        }
        out
    }

    /// Convenience: only the triples of [`Self::stream`].
    pub fn triples(&self, prefer: &Prefer) -> Graph {
        self.stream(prefer).into_iter().map(|(_, t)| t).collect()
    }

    /// Entity tag of the resource's primary representation.
    ///
    /// NonRDFSources get a strong tag over their binary location and
    /// modification time; everything else gets the weak RDF tag.
    pub fn entity_tag(&self) -> EntityTag {
        match &self.binary {
            Some(binary) => EntityTag::strong(TagHasher::BINARY.digest([
                binary.identifier.as_str(),
                &format_instant(&self.modified),
            ])),
            None => self.description_entity_tag(),
        }
    }

    /// Weak tag over every triple an "include all" read shows, except the
    /// audit partition, which never affects tags.
    pub fn description_entity_tag(&self) -> EntityTag {
        let prefer = Prefer::include_all().omit(Section::Graph(GraphName::Audit));
        let mut lines: Vec<String> = self
            .stream(&prefer)
            .into_iter()
            .map(|(g, t)| format!("{t} <{g}> ."))
            .collect();
        lines.sort();
        let mut parts = vec![
            self.identifier.as_str().to_string(),
            format_instant(&self.modified),
        ];
        parts.extend(lines);
        EntityTag::weak(TagHasher::RDF.digest(parts))
    }
}

/// RFC 3339 with nanosecond precision, used wherever an instant is hashed or
/// rendered as a literal.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Outcome of resolving an identifier.
///
/// Absence is a first-class outcome: `Deleted` means the identifier once
/// resolved to a resource, `Missing` means it never did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceLookup {
    Present(Box<Resource>),
    Deleted,
    Missing,
}

impl ResourceLookup {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Self::Present(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_resource(self) -> Option<Resource> {
        match self {
            Self::Present(r) => Some(*r),
            _ => None,
        }
    }
}
