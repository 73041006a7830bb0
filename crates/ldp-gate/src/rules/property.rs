use ldp_types::vocab::ldp;
use ldp_types::{ConstraintKind, ConstraintViolation, Triple};

use crate::rule::{ConstraintRule, Proposal, RuleDecision};

/// Containment is server-derived; clients may not assert `ldp:contains`.
pub struct ServerManagedPropertyRule;

impl ConstraintRule for ServerManagedPropertyRule {
    fn name(&self) -> &str {
        "server-managed-property"
    }

    fn evaluate(&self, proposal: &Proposal<'_>) -> RuleDecision {
        let offending: Vec<Triple> = proposal
            .user
            .iter()
            .filter(|t| t.predicate.as_str() == ldp::CONTAINS)
            .cloned()
            .collect();
        if offending.is_empty() {
            RuleDecision::Pass
        } else {
            RuleDecision::Violation(
                ConstraintViolation::new(
                    ConstraintKind::InvalidProperty,
                    "ldp:contains is managed by the server",
                )
                .with_triples(offending),
            )
        }
    }
}
