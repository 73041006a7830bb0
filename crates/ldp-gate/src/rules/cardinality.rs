use ldp_types::vocab::ldp;
use ldp_types::{ConstraintKind, ConstraintViolation, InteractionModel, Triple};

use crate::rule::{ConstraintRule, Proposal, RuleDecision};

/// 0/1 cardinality of Direct/Indirect container membership triples.
///
/// - exactly one `ldp:membershipResource`
/// - exactly one of `ldp:hasMemberRelation` / `ldp:isMemberOfRelation`
/// - Direct: at most one `ldp:insertedContentRelation`
/// - Indirect: exactly one `ldp:insertedContentRelation`
///
/// Only triples whose subject is the container itself are counted.
pub struct CardinalityRule;

impl CardinalityRule {
    fn violation(proposal: &Proposal<'_>, message: String, predicates: &[&str]) -> RuleDecision {
        let offending: Vec<Triple> = predicates
            .iter()
            .flat_map(|p| proposal.user.matching(proposal.identifier, p).cloned())
            .collect();
        RuleDecision::Violation(
            ConstraintViolation::new(ConstraintKind::InvalidCardinality, message)
                .with_triples(offending),
        )
    }
}

impl ConstraintRule for CardinalityRule {
    fn name(&self) -> &str {
        "cardinality"
    }

    fn evaluate(&self, proposal: &Proposal<'_>) -> RuleDecision {
        let model = proposal.interaction_model;
        if !model.has_membership() {
            return RuleDecision::Pass;
        }
        let count = |predicate: &str| proposal.user.count(proposal.identifier, predicate);

        let membership_resources = count(ldp::MEMBERSHIP_RESOURCE);
        if membership_resources != 1 {
            return Self::violation(
                proposal,
                format!(
                    "{model} requires exactly one ldp:membershipResource, found {membership_resources}"
                ),
                &[ldp::MEMBERSHIP_RESOURCE],
            );
        }

        let has_member = count(ldp::HAS_MEMBER_RELATION);
        let is_member_of = count(ldp::IS_MEMBER_OF_RELATION);
        if has_member + is_member_of != 1 {
            return Self::violation(
                proposal,
                format!(
                    "{model} requires exactly one of ldp:hasMemberRelation or \
                     ldp:isMemberOfRelation, found {has_member} and {is_member_of}"
                ),
                &[ldp::HAS_MEMBER_RELATION, ldp::IS_MEMBER_OF_RELATION],
            );
        }

        let inserted = count(ldp::INSERTED_CONTENT_RELATION);
        let allowed = match model {
            InteractionModel::IndirectContainer => inserted == 1,
            _ => inserted <= 1,
        };
        if !allowed {
            return Self::violation(
                proposal,
                format!("{model} has {inserted} ldp:insertedContentRelation triples"),
                &[ldp::INSERTED_CONTENT_RELATION],
            );
        }

        RuleDecision::Pass
    }
}
