//! The storage contract shared by every quad store backend.

use chrono::{DateTime, Utc};

use ldp_types::{Graph, GraphName, NamedNode, ResourceLookup};

use crate::error::StoreResult;
use crate::record::ResourceRecord;

/// Durable keyed storage of per-resource triple partitions.
///
/// All implementations must satisfy these invariants:
/// - `create` is atomic: of concurrent creators of one identifier, at most
///   one succeeds.
/// - `replace` swaps the user-managed and ACL partitions wholesale and never
///   touches the audit partition.
/// - `delete` leaves a tombstone, so `get` distinguishes Deleted from Missing.
/// - The audit partition is append-only and survives deletion.
/// - Absence is reported through [`ResourceLookup`], never as an error.
/// - Backend failures are reported as `StorageFailure`, never swallowed.
pub trait QuadStore: Send + Sync {
    /// Persist a new resource. Fails with `Conflict` if the identifier
    /// resolves to a live resource; creating over a tombstone is allowed.
    fn create(&self, record: ResourceRecord) -> StoreResult<()>;

    /// Replace a live resource. Fails with `NotFound` if missing or deleted.
    fn replace(&self, record: ResourceRecord) -> StoreResult<()>;

    /// Tombstone a live resource. Fails with `NotFound` if missing or deleted.
    fn delete(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<()>;

    /// Append triples to a server-derived partition without creating a
    /// version or changing `modified`. Only [`GraphName::Audit`] accepts
    /// appends; tombstoned identifiers still accept them.
    fn add(&self, identifier: &NamedNode, graph: GraphName, triples: Graph) -> StoreResult<()>;

    /// Bump `modified` on a live resource. Returns `false` if it is not live.
    fn touch(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Resolve an identifier. Derived containment/membership views are empty.
    fn get(&self, identifier: &NamedNode) -> StoreResult<ResourceLookup>;

    /// The audit partition, including for deleted resources.
    fn audit(&self, identifier: &NamedNode) -> StoreResult<Graph>;

    /// Every live record, sorted by identifier. Used to rebuild indexes.
    fn records(&self) -> StoreResult<Vec<ResourceRecord>>;
}
