//! In-memory quad store for tests and embedding.
//!
//! [`InMemoryQuadStore`] keeps one entry per identifier, holding its live
//! record or tombstone plus its audit partition, in a `HashMap` behind a
//! single `RwLock`. It implements the full
//! [`QuadStore`](crate::QuadStore) trait.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use ldp_types::{Graph, GraphName, NamedNode, ResourceLookup};

use crate::error::{StoreError, StoreResult};
use crate::record::ResourceRecord;
use crate::traits::QuadStore;

/// Current state of an identifier's slot.
#[derive(Clone, Debug)]
enum Slot {
    Live(Box<ResourceRecord>),
    Tombstone { deleted: DateTime<Utc> },
}

#[derive(Clone, Debug)]
struct Entry {
    slot: Slot,
    audit: Graph,
}

/// In-memory, HashMap-based quad store.
///
/// Intended for tests and embedding. All state lives behind a single
/// `RwLock`; every mutation is a check-and-set under the write lock, which
/// makes `create` atomic for concurrent creators of the same identifier.
pub struct InMemoryQuadStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryQuadStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|m| {
                m.values()
                    .filter(|e| matches!(e.slot, Slot::Live(_)))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tombstoned identifiers.
    pub fn tombstone_count(&self) -> usize {
        self.entries
            .read()
            .map(|m| {
                m.values()
                    .filter(|e| matches!(e.slot, Slot::Tombstone { .. }))
                    .count()
            })
            .unwrap_or(0)
    }

    /// When the identifier was tombstoned, if it currently is.
    pub fn deleted_at(&self, identifier: &NamedNode) -> StoreResult<Option<DateTime<Utc>>> {
        let map = self.entries.read()?;
        Ok(match map.get(identifier.as_str()).map(|e| &e.slot) {
            Some(Slot::Tombstone { deleted }) => Some(*deleted),
            _ => None,
        })
    }
}

impl Default for InMemoryQuadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadStore for InMemoryQuadStore {
    fn create(&self, record: ResourceRecord) -> StoreResult<()> {
        let mut map = self.entries.write()?;
        let key = record.identifier.as_str().to_string();
        if let Some(entry) = map.get_mut(&key) {
            if matches!(entry.slot, Slot::Live(_)) {
                return Err(StoreError::Conflict(format!("{key} already exists")));
            }
            debug!(identifier = %key, "recreating over tombstone");
            entry.slot = Slot::Live(Box::new(record));
            return Ok(());
        }
        map.insert(
            key,
            Entry {
                slot: Slot::Live(Box::new(record)),
                audit: Graph::new(),
            },
        );
        Ok(())
    }

    fn replace(&self, record: ResourceRecord) -> StoreResult<()> {
        let mut map = self.entries.write()?;
        let key = record.identifier.as_str();
        match map.get_mut(key) {
            Some(Entry {
                slot: slot @ Slot::Live(_),
                ..
            }) => {
                *slot = Slot::Live(Box::new(record));
                Ok(())
            }
            _ => Err(StoreError::NotFound(key.to_string())),
        }
    }

    fn delete(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<()> {
        let mut map = self.entries.write()?;
        match map.get_mut(identifier.as_str()) {
            Some(Entry {
                slot: slot @ Slot::Live(_),
                ..
            }) => {
                *slot = Slot::Tombstone { deleted: at };
                Ok(())
            }
            _ => Err(StoreError::NotFound(identifier.as_str().to_string())),
        }
    }

    fn add(&self, identifier: &NamedNode, graph: GraphName, triples: Graph) -> StoreResult<()> {
        if graph != GraphName::Audit {
            return Err(StoreError::Conflict(format!(
                "partition {graph} does not accept appends"
            )));
        }
        let mut map = self.entries.write()?;
        let entry = map
            .get_mut(identifier.as_str())
            .ok_or_else(|| StoreError::NotFound(identifier.as_str().to_string()))?;
        entry.audit.extend(triples);
        Ok(())
    }

    fn touch(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<bool> {
        let mut map = self.entries.write()?;
        match map.get_mut(identifier.as_str()).map(|e| &mut e.slot) {
            Some(Slot::Live(record)) => {
                if at > record.modified {
                    record.modified = at;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn get(&self, identifier: &NamedNode) -> StoreResult<ResourceLookup> {
        let map = self.entries.read()?;
        Ok(match map.get(identifier.as_str()) {
            Some(Entry {
                slot: Slot::Live(record),
                audit,
            }) => ResourceLookup::Present(Box::new(record.to_resource(audit.clone()))),
            Some(_) => ResourceLookup::Deleted,
            None => ResourceLookup::Missing,
        })
    }

    fn audit(&self, identifier: &NamedNode) -> StoreResult<Graph> {
        let map = self.entries.read()?;
        Ok(map
            .get(identifier.as_str())
            .map(|e| e.audit.clone())
            .unwrap_or_default())
    }

    fn records(&self) -> StoreResult<Vec<ResourceRecord>> {
        let map = self.entries.read()?;
        let mut records: Vec<ResourceRecord> = map
            .values()
            .filter_map(|e| match &e.slot {
                Slot::Live(record) => Some((**record).clone()),
                Slot::Tombstone { .. } => None,
            })
            .collect();
        records.sort_by(|a, b| a.identifier.as_str().cmp(b.identifier.as_str()));
        Ok(records)
    }
}

impl std::fmt::Debug for InMemoryQuadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQuadStore")
            .field("live", &self.len())
            .field("tombstones", &self.tombstone_count())
            .finish()
    }
}
