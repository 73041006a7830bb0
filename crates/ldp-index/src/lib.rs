//! Derived containment and membership views for LDP containers.
//!
//! Neither `ldp:contains` nor membership triples are stored. The
//! [`ContainmentIndex`] tracks which children each container holds, and the
//! [`MembershipResolver`] combines that with each Direct/Indirect container's
//! configuration to produce membership triples at read time.
//!
//! # Key Types
//!
//! - [`ContainmentIndex`] -- container -> children sets, one container per child
//! - [`MembershipResolver`] -- membership triples for any resource
//!
//! Both can be rebuilt from the live records of a `QuadStore`.

pub mod containment;
pub mod error;
pub mod membership;

pub use containment::ContainmentIndex;
pub use error::{IndexError, IndexResult};
pub use membership::MembershipResolver;
