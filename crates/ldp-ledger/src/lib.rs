//! History and provenance for LDP resources.
//!
//! - [`VersionedResourceLog`] keeps an immutable Memento history per
//!   identifier: one snapshot for every successful create, replace and
//!   delete, addressable through a [`TimeMap`] or a TimeGate lookup.
//! - [`AuditLog`] appends PROV activities to a resource's audit partition
//!   and projects them back out as [`Activity`] records.
//!
//! # Design Rules
//!
//! 1. Versions are appended only after the store write they describe has
//!    committed, and are never edited.
//! 2. A TimeGate lookup that predates the first version is an error, never a
//!    silent fallback to the earliest version.
//! 3. Audit appends never create a version and never change an entity tag.

pub mod audit;
pub mod error;
pub mod memento;
pub mod memory;
pub mod traits;

pub use audit::{Activity, ActivityKind, AuditLog};
pub use error::{LedgerError, LedgerResult};
pub use memento::{version_uri, Memento, MementoRef, TimeMap, VersionState};
pub use memory::InMemoryVersionLog;
pub use traits::VersionedResourceLog;
