//! The Memento version log contract.

use chrono::{DateTime, Utc};

use ldp_types::NamedNode;

use crate::error::LedgerResult;
use crate::memento::{Memento, TimeMap, VersionState};

/// Append-only, per-identifier version history.
///
/// Versions are immutable once written. Datetimes within one identifier's
/// history are strictly increasing.
pub trait VersionedResourceLog: Send + Sync {
    /// Record a new version. Fails with `OutOfOrder` unless `at` is later
    /// than every existing version of the identifier.
    fn append(
        &self,
        identifier: &NamedNode,
        at: DateTime<Utc>,
        state: VersionState,
    ) -> LedgerResult<Memento>;

    /// Every version, oldest first. Fails with `UnknownResource` if none.
    fn timemap(&self, identifier: &NamedNode) -> LedgerResult<TimeMap>;

    /// The latest version whose datetime is not after `accept`. Fails with
    /// `NoVersionBefore` rather than falling back to the earliest version.
    fn timegate(&self, identifier: &NamedNode, accept: DateTime<Utc>) -> LedgerResult<Memento>;

    /// The version recorded at exactly `at`, if any.
    fn memento(&self, identifier: &NamedNode, at: DateTime<Utc>) -> LedgerResult<Option<Memento>>;

    /// Number of versions recorded for the identifier.
    fn version_count(&self, identifier: &NamedNode) -> LedgerResult<usize>;
}
