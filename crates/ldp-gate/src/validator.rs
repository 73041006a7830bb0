//! The constraint validation pipeline.

use ldp_types::ConstraintViolation;
use tracing::debug;

use crate::rule::{ConstraintRule, Proposal, RuleDecision};
use crate::rules::{CardinalityRule, RangeRule, ServerManagedPropertyRule};

// ---------------------------------------------------------------------------
// ConstraintValidator
// ---------------------------------------------------------------------------

/// An ordered pipeline of structural rules that every proposed user graph
/// passes through before it is written.
pub struct ConstraintValidator {
    rules: Vec<Box<dyn ConstraintRule>>,
}

impl ConstraintValidator {
    /// An empty pipeline that accepts everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard pipeline: Cardinality -> Range -> ServerManagedProperty.
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(CardinalityRule));
        validator.add_rule(Box::new(RangeRule));
        validator.add_rule(Box::new(ServerManagedPropertyRule));
        validator
    }

    /// Append a rule to the end of the pipeline.
    pub fn add_rule(&mut self, rule: Box<dyn ConstraintRule>) {
        self.rules.push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate the proposal. Fail-fast: the first violating rule wins.
    pub fn validate(&self, proposal: &Proposal<'_>) -> Result<(), ConstraintViolation> {
        for rule in &self.rules {
            if let RuleDecision::Violation(violation) = rule.evaluate(proposal) {
                debug!(
                    identifier = %proposal.identifier,
                    rule = rule.name(),
                    constraint = violation.kind.iri_str(),
                    "constraint violation"
                );
                return Err(violation);
            }
        }
        Ok(())
    }

    /// Every violation across all rules, in pipeline order.
    pub fn violations(&self, proposal: &Proposal<'_>) -> Vec<ConstraintViolation> {
        self.rules
            .iter()
            .filter_map(|rule| match rule.evaluate(proposal) {
                RuleDecision::Pass => None,
                RuleDecision::Violation(v) => Some(v),
            })
            .collect()
    }
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl std::fmt::Debug for ConstraintValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintValidator")
            .field("rules", &self.rule_names())
            .finish()
    }
}
