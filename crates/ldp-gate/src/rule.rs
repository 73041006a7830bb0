use ldp_types::{ConstraintViolation, Graph, InteractionModel, NamedNode};

/// A proposed resource state, evaluated before any durable write.
#[derive(Clone, Copy, Debug)]
pub struct Proposal<'a> {
    pub identifier: &'a NamedNode,
    pub interaction_model: InteractionModel,
    /// The submitted user-managed triples.
    pub user: &'a Graph,
}

impl<'a> Proposal<'a> {
    pub fn new(
        identifier: &'a NamedNode,
        interaction_model: InteractionModel,
        user: &'a Graph,
    ) -> Self {
        Self {
            identifier,
            interaction_model,
            user,
        }
    }
}

/// The outcome of a single rule evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleDecision {
    Pass,
    Violation(ConstraintViolation),
}

impl RuleDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// A single structural rule in the validation pipeline.
///
/// Rules are pure: they inspect the proposal and never touch storage. The
/// trait is object-safe and `Send + Sync` so rules can be stored in a
/// `Vec<Box<dyn ConstraintRule>>`.
pub trait ConstraintRule: Send + Sync {
    /// Human-readable name (e.g., "cardinality", "range").
    fn name(&self) -> &str;

    fn evaluate(&self, proposal: &Proposal<'_>) -> RuleDecision;
}
