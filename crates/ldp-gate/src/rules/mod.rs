//! Built-in constraint rules.

mod cardinality;
mod property;
mod range;

pub use cardinality::CardinalityRule;
pub use property::ServerManagedPropertyRule;
pub use range::RangeRule;
