//! Foundation types for the LDP resource store.
//!
//! Every other crate in the workspace depends on `ldp-types`.
//!
//! # Key Types
//!
//! - [`InteractionModel`] -- closed set of LDP interaction models
//! - [`GraphName`] -- semantic partition of a resource's triples
//! - [`Graph`] / [`Dataset`] -- triple sets, optionally partitioned
//! - [`Prefer`] -- which representation sections a read yields
//! - [`Resource`] / [`ResourceLookup`] -- current state, or a Deleted/Missing outcome
//! - [`Metadata`] -- caller-supplied write metadata
//! - [`EntityTag`] -- weak/strong representation tags
//! - [`ConstraintViolation`] -- structured validation failure

pub mod constraint;
pub mod error;
pub mod etag;
pub mod graph;
pub mod identifier;
pub mod metadata;
pub mod model;
pub mod resource;
pub mod vocab;

pub use constraint::{ConstraintKind, ConstraintViolation};
pub use error::TypeError;
pub use etag::{EntityTag, TagHasher};
pub use graph::{Dataset, Graph, GraphName, Prefer, Section};
pub use identifier::IdentifierSupplier;
pub use metadata::{Metadata, MetadataBuilder};
pub use model::InteractionModel;
pub use resource::{
    format_instant, BinaryMetadata, MemberRelation, MembershipConfig, Resource, ResourceLookup,
};

// RDF primitives used throughout the public API.
pub use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
