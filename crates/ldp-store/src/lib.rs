//! Partitioned quad storage for the LDP resource store.
//!
//! A resource's triples are kept in semantic partitions (user-managed,
//! access-control, audit); server-managed triples are re-derived from the
//! stored metadata on every read.
//!
//! # Storage Backends
//!
//! All backends implement the [`QuadStore`] trait:
//!
//! - [`InMemoryQuadStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. `create` is check-and-set: at most one concurrent creator wins.
//! 2. Deletion leaves a tombstone; absence is a lookup outcome, not an error.
//! 3. The audit partition is append-only and outlives deletion.
//! 4. `add` never creates a version and never changes `modified`.
//! 5. All backend failures surface as `StorageFailure`.

pub mod clock;
pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use clock::VersionClock;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryQuadStore;
pub use record::ResourceRecord;
pub use traits::QuadStore;
