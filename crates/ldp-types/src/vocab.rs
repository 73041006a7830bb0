//! Fixed predicate and class IRIs used by the store.
//!
//! These are configuration-level constants: the store compares predicates
//! against them but never dereferences them.

use oxrdf::NamedNode;

/// Build a [`NamedNode`] from a vocabulary constant.
///
/// Only call this with known-good IRIs (the constants in this module or IRIs
/// that have already been validated).
pub fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod xsd {
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

pub mod dc {
    pub const IS_PART_OF: &str = "http://purl.org/dc/terms/isPartOf";
    pub const HAS_PART: &str = "http://purl.org/dc/terms/hasPart";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
    pub const RELATION: &str = "http://purl.org/dc/terms/relation";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
}

pub mod ldp {
    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";
    pub const NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const DIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#DirectContainer";
    pub const INDIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#IndirectContainer";

    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const MEMBERSHIP_RESOURCE: &str = "http://www.w3.org/ns/ldp#membershipResource";
    pub const HAS_MEMBER_RELATION: &str = "http://www.w3.org/ns/ldp#hasMemberRelation";
    pub const IS_MEMBER_OF_RELATION: &str = "http://www.w3.org/ns/ldp#isMemberOfRelation";
    pub const INSERTED_CONTENT_RELATION: &str =
        "http://www.w3.org/ns/ldp#insertedContentRelation";
    pub const MEMBER_SUBJECT: &str = "http://www.w3.org/ns/ldp#MemberSubject";

    pub const PREFER_CONTAINMENT: &str = "http://www.w3.org/ns/ldp#PreferContainment";
    pub const PREFER_MEMBERSHIP: &str = "http://www.w3.org/ns/ldp#PreferMembership";
}

pub mod prov {
    pub const ACTIVITY: &str = "http://www.w3.org/ns/prov#Activity";
    pub const AT_TIME: &str = "http://www.w3.org/ns/prov#atTime";
    pub const WAS_ASSOCIATED_WITH: &str = "http://www.w3.org/ns/prov#wasAssociatedWith";
    pub const WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
}

pub mod activity_streams {
    pub const CREATE: &str = "https://www.w3.org/ns/activitystreams#Create";
    pub const UPDATE: &str = "https://www.w3.org/ns/activitystreams#Update";
    pub const DELETE: &str = "https://www.w3.org/ns/activitystreams#Delete";
}

pub mod trellis {
    pub const PREFER_USER_MANAGED: &str = "http://www.trellisldp.org/ns/trellis#PreferUserManaged";
    pub const PREFER_SERVER_MANAGED: &str =
        "http://www.trellisldp.org/ns/trellis#PreferServerManaged";
    pub const PREFER_ACCESS_CONTROL: &str =
        "http://www.trellisldp.org/ns/trellis#PreferAccessControl";
    pub const PREFER_AUDIT: &str = "http://www.trellisldp.org/ns/trellis#PreferAudit";

    pub const INVALID_CARDINALITY: &str = "http://www.trellisldp.org/ns/trellis#InvalidCardinality";
    pub const INVALID_RANGE: &str = "http://www.trellisldp.org/ns/trellis#InvalidRange";
    pub const INVALID_PROPERTY: &str = "http://www.trellisldp.org/ns/trellis#InvalidProperty";

    pub const ANONYMOUS_AGENT: &str = "http://www.trellisldp.org/ns/trellis#AnonymousAgent";
}
