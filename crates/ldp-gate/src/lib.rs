//! Structural constraint validation for LDP resources.
//!
//! Every create or replace passes its submitted user-managed graph through a
//! [`ConstraintValidator`] before anything is written. The validator runs an
//! ordered pipeline of [`ConstraintRule`]s and stops at the first violation.
//!
//! # Default Rules
//!
//! - [`CardinalityRule`] -- Direct/Indirect membership triples appear the
//!   required number of times
//! - [`RangeRule`] -- `rdf:type` and membership predicates point at IRIs
//! - [`ServerManagedPropertyRule`] -- clients cannot assert `ldp:contains`
//!
//! # Quick Start
//!
//! ```rust
//! use ldp_gate::{ConstraintValidator, Proposal};
//! use ldp_types::{vocab, Graph, InteractionModel};
//!
//! let validator = ConstraintValidator::with_default_rules();
//! let id = vocab::iri("http://example.com/resource");
//! let user = Graph::new();
//! let proposal = Proposal::new(&id, InteractionModel::RdfSource, &user);
//! assert!(validator.validate(&proposal).is_ok());
//! ```

pub mod rule;
pub mod rules;
pub mod validator;

pub use rule::{ConstraintRule, Proposal, RuleDecision};
pub use rules::{CardinalityRule, RangeRule, ServerManagedPropertyRule};
pub use validator::ConstraintValidator;
