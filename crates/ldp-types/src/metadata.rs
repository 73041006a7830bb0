use oxrdf::NamedNode;

use crate::etag::EntityTag;
use crate::model::InteractionModel;
use crate::resource::BinaryMetadata;

/// Caller-supplied metadata accompanying a create, replace, or delete.
///
/// Membership configuration is not part of the metadata: it is read from the
/// container's user-managed triples so that a replace of those triples is
/// all it takes to change a container's relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub identifier: NamedNode,
    pub interaction_model: InteractionModel,
    pub container: Option<NamedNode>,
    pub binary: Option<BinaryMetadata>,
    /// Precondition: the entity tag the caller last observed.
    pub expected_etag: Option<EntityTag>,
    /// The agent performing the operation, recorded in the audit log.
    pub agent: Option<NamedNode>,
}

impl Metadata {
    pub fn builder(identifier: NamedNode) -> MetadataBuilder {
        MetadataBuilder {
            metadata: Metadata {
                identifier,
                interaction_model: InteractionModel::RdfSource,
                container: None,
                binary: None,
                expected_etag: None,
                agent: None,
            },
        }
    }
}

/// Builder for [`Metadata`]. Defaults to an RDFSource with no parent.
#[derive(Clone, Debug)]
pub struct MetadataBuilder {
    metadata: Metadata,
}

impl MetadataBuilder {
    pub fn interaction_model(mut self, model: InteractionModel) -> Self {
        self.metadata.interaction_model = model;
        self
    }

    pub fn container(mut self, container: NamedNode) -> Self {
        self.metadata.container = Some(container);
        self
    }

    pub fn binary(mut self, binary: BinaryMetadata) -> Self {
        self.metadata.binary = Some(binary);
        self
    }

    pub fn expected_etag(mut self, etag: EntityTag) -> Self {
        self.metadata.expected_etag = Some(etag);
        self
    }

    pub fn agent(mut self, agent: NamedNode) -> Self {
        self.metadata.agent = Some(agent);
        self
    }

    pub fn build(self) -> Metadata {
        self.metadata
    }
}
