use chrono::{DateTime, Utc};

use ldp_types::{
    BinaryMetadata, Graph, InteractionModel, MembershipConfig, Metadata, NamedNode, Resource,
};

/// What the store persists for a live resource.
///
/// Server-managed triples are not stored; they are re-derived from these
/// fields on read. The audit partition is held separately by the store
/// because it outlives deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    pub identifier: NamedNode,
    pub interaction_model: InteractionModel,
    pub container: Option<NamedNode>,
    pub membership: Option<MembershipConfig>,
    pub binary: Option<BinaryMetadata>,
    pub modified: DateTime<Utc>,
    pub user: Graph,
    pub acl: Graph,
}

impl ResourceRecord {
    /// Assemble a record from write metadata and already-validated graphs.
    pub fn from_metadata(
        metadata: &Metadata,
        user: Graph,
        acl: Graph,
        modified: DateTime<Utc>,
    ) -> Self {
        let membership =
            MembershipConfig::from_graph(&metadata.identifier, metadata.interaction_model, &user);
        let binary = if metadata.interaction_model == InteractionModel::NonRdfSource {
            metadata.binary.clone()
        } else {
            None
        };
        Self {
            identifier: metadata.identifier.clone(),
            interaction_model: metadata.interaction_model,
            container: metadata.container.clone(),
            membership,
            binary,
            modified,
            user,
            acl,
        }
    }

    /// The resource view of this record with the given audit partition and
    /// no derived triples.
    pub fn to_resource(&self, audit: Graph) -> Resource {
        Resource {
            identifier: self.identifier.clone(),
            interaction_model: self.interaction_model,
            container: self.container.clone(),
            membership: self.membership.clone(),
            binary: self.binary.clone(),
            modified: self.modified,
            user: self.user.clone(),
            acl: self.acl.clone(),
            audit,
            containment: Graph::new(),
            membership_triples: Graph::new(),
        }
    }
}
