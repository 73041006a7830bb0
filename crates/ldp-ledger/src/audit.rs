//! PROV activities recorded in a resource's audit partition.
//!
//! An [`Activity`] is written as five triples linked from the resource by
//! `prov:wasGeneratedBy`; [`AuditLog::activities`] reads them back.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use ldp_store::QuadStore;
use ldp_types::vocab::{self, activity_streams, prov, rdf, xsd};
use ldp_types::{format_instant, Graph, GraphName, Literal, NamedNode, Subject, Term, Triple};

use crate::error::{LedgerError, LedgerResult};

/// The kind of change an activity records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Create,
    Update,
    Delete,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 3] = [Self::Create, Self::Update, Self::Delete];

    /// The ActivityStreams type IRI.
    pub fn iri_str(&self) -> &'static str {
        match self {
            Self::Create => activity_streams::CREATE,
            Self::Update => activity_streams::UPDATE,
            Self::Delete => activity_streams::DELETE,
        }
    }

    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.iri_str() == iri)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        };
        write!(f, "{name}")
    }
}

/// One provenance activity, as projected back out of an audit partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    pub node: NamedNode,
    pub kind: ActivityKind,
    pub at_time: DateTime<Utc>,
    pub agent: NamedNode,
}

impl Activity {
    /// A fresh activity with a `urn:uuid` node.
    pub fn new(kind: ActivityKind, at_time: DateTime<Utc>, agent: NamedNode) -> Self {
        Self {
            node: vocab::iri(&format!("urn:uuid:{}", Uuid::now_v7())),
            kind,
            at_time,
            agent,
        }
    }

    /// The audit triples recording this activity against `resource`.
    pub fn triples(&self, resource: &NamedNode) -> Graph {
        let rdf_type = vocab::iri(rdf::TYPE);
        [
            Triple::new(
                resource.clone(),
                vocab::iri(prov::WAS_GENERATED_BY),
                self.node.clone(),
            ),
            Triple::new(self.node.clone(), rdf_type.clone(), vocab::iri(prov::ACTIVITY)),
            Triple::new(self.node.clone(), rdf_type, vocab::iri(self.kind.iri_str())),
            Triple::new(
                self.node.clone(),
                vocab::iri(prov::AT_TIME),
                Literal::new_typed_literal(format_instant(&self.at_time), vocab::iri(xsd::DATE_TIME)),
            ),
            Triple::new(
                self.node.clone(),
                vocab::iri(prov::WAS_ASSOCIATED_WITH),
                self.agent.clone(),
            ),
        ]
        .into_iter()
        .collect()
    }

    /// Whether `node` carries at least one activity type.
    fn is_typed(audit: &Graph, node: &NamedNode) -> bool {
        audit
            .iri_objects(node, rdf::TYPE)
            .iter()
            .any(|t| ActivityKind::from_iri(t.as_str()).is_some())
    }

    /// Reassemble the activity `node` from an audit graph. Each of its
    /// properties must appear exactly once.
    fn parse(audit: &Graph, node: &NamedNode) -> LedgerResult<Self> {
        let malformed = |reason: String| LedgerError::MalformedActivity {
            node: node.to_string(),
            reason,
        };
        let single = |predicate: &str| -> LedgerResult<Term> {
            let objects: Vec<&Term> = audit.objects(node, predicate).collect();
            match objects.as_slice() {
                [object] => Ok((*object).clone()),
                [] => Err(malformed(format!("missing <{predicate}>"))),
                _ => Err(malformed(format!("repeated <{predicate}>"))),
            }
        };

        let kinds: Vec<ActivityKind> = audit
            .iri_objects(node, rdf::TYPE)
            .iter()
            .filter_map(|t| ActivityKind::from_iri(t.as_str()))
            .collect();
        let kind = match kinds.as_slice() {
            [kind] => *kind,
            [] => return Err(malformed("no activity type".into())),
            _ => return Err(malformed("multiple activity types".into())),
        };

        let at_time = match single(prov::AT_TIME)? {
            Term::Literal(lit) => DateTime::parse_from_rfc3339(lit.value())
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| malformed(format!("bad atTime: {e}")))?,
            _ => return Err(malformed("atTime is not a literal".into())),
        };

        let agent = match single(prov::WAS_ASSOCIATED_WITH)? {
            Term::NamedNode(agent) => agent,
            _ => return Err(malformed("agent is not an IRI".into())),
        };

        Ok(Self {
            node: node.clone(),
            kind,
            at_time,
            agent,
        })
    }
}

/// Append-only provenance recorded in each resource's audit partition.
///
/// Appends go through [`QuadStore::add`], so they never create a version and
/// never change `modified` or the entity tag.
pub struct AuditLog {
    store: Arc<dyn QuadStore>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn QuadStore>) -> Self {
        Self { store }
    }

    /// Record an activity of `kind` against `resource`.
    pub fn record(
        &self,
        resource: &NamedNode,
        kind: ActivityKind,
        at: DateTime<Utc>,
        agent: &NamedNode,
    ) -> LedgerResult<Activity> {
        let activity = Activity::new(kind, at, agent.clone());
        self.store
            .add(resource, GraphName::Audit, activity.triples(resource))?;
        debug!(
            identifier = %resource,
            activity = %activity.node,
            kind = %kind,
            "audit activity recorded"
        );
        Ok(activity)
    }

    /// Every activity recorded against `resource`, oldest first.
    pub fn activities(&self, resource: &NamedNode) -> LedgerResult<Vec<Activity>> {
        let audit = self.store.audit(resource)?;
        Self::project(&audit, resource)
    }

    /// Parse the activities linked from `resource` in an audit graph.
    pub fn project(audit: &Graph, resource: &NamedNode) -> LedgerResult<Vec<Activity>> {
        let mut activities = Vec::new();
        for triple in audit.matching(resource, prov::WAS_GENERATED_BY) {
            match &triple.object {
                Term::NamedNode(node) if !Activity::is_typed(audit, node) => {
                    warn!(identifier = %resource, node = %node, "skipping untyped activity link");
                }
                Term::NamedNode(node) => activities.push(Activity::parse(audit, node)?),
                other => {
                    warn!(identifier = %resource, object = %other, "skipping non-IRI activity link");
                }
            }
        }
        activities.sort_by(|a, b| {
            a.at_time
                .cmp(&b.at_time)
                .then_with(|| a.node.as_str().cmp(b.node.as_str()))
        });
        Ok(activities)
    }

    /// Activity nodes in `audit`: subjects typed `prov:Activity`.
    pub fn activity_nodes(audit: &Graph) -> Vec<NamedNode> {
        let mut nodes: Vec<NamedNode> = audit
            .iter()
            .filter(|t| {
                t.predicate.as_str() == rdf::TYPE
                    && matches!(&t.object, Term::NamedNode(o) if o.as_str() == prov::ACTIVITY)
            })
            .filter_map(|t| match &t.subject {
                Subject::NamedNode(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        nodes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        nodes
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}
