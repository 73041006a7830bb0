use ldp_types::vocab::{ldp, rdf};
use ldp_types::{ConstraintKind, ConstraintViolation, Term, Triple};

use crate::rule::{ConstraintRule, Proposal, RuleDecision};

/// Predicates whose objects must be IRIs when the subject is the resource.
const IRI_VALUED: [&str; 4] = [
    ldp::MEMBERSHIP_RESOURCE,
    ldp::HAS_MEMBER_RELATION,
    ldp::IS_MEMBER_OF_RELATION,
    ldp::INSERTED_CONTENT_RELATION,
];

/// Object-type constraints.
///
/// An `rdf:type` object anywhere in the user graph must be a class
/// identifier, not a literal. Membership predicates on the resource itself
/// must point at IRIs.
pub struct RangeRule;

impl ConstraintRule for RangeRule {
    fn name(&self) -> &str {
        "range"
    }

    fn evaluate(&self, proposal: &Proposal<'_>) -> RuleDecision {
        let literal_types: Vec<Triple> = proposal
            .user
            .iter()
            .filter(|t| t.predicate.as_str() == rdf::TYPE && matches!(t.object, Term::Literal(_)))
            .cloned()
            .collect();
        if !literal_types.is_empty() {
            return RuleDecision::Violation(
                ConstraintViolation::new(
                    ConstraintKind::InvalidRange,
                    "rdf:type objects must be class identifiers, not literals",
                )
                .with_triples(literal_types),
            );
        }

        let non_iri: Vec<Triple> = IRI_VALUED
            .iter()
            .flat_map(|p| proposal.user.matching(proposal.identifier, p))
            .filter(|t| !matches!(t.object, Term::NamedNode(_)))
            .cloned()
            .collect();
        if !non_iri.is_empty() {
            return RuleDecision::Violation(
                ConstraintViolation::new(
                    ConstraintKind::InvalidRange,
                    "membership predicates must have IRI objects",
                )
                .with_triples(non_iri),
            );
        }

        RuleDecision::Pass
    }
}
