//! In-memory version log.
//!
//! [`InMemoryVersionLog`] keeps one ordered `Vec` of mementos per identifier
//! behind a `RwLock` and answers TimeGate lookups by binary search.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::debug;

use ldp_types::{format_instant, NamedNode};

use crate::error::{LedgerError, LedgerResult};
use crate::memento::{Memento, MementoRef, TimeMap, VersionState};
use crate::traits::VersionedResourceLog;

/// In-memory version log for tests and embedding.
pub struct InMemoryVersionLog {
    histories: RwLock<HashMap<String, Vec<Memento>>>,
}

impl InMemoryVersionLog {
    pub fn new() -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Number of identifiers with at least one version.
    pub fn resource_count(&self) -> usize {
        self.histories.read().map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for InMemoryVersionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionedResourceLog for InMemoryVersionLog {
    fn append(
        &self,
        identifier: &NamedNode,
        at: DateTime<Utc>,
        state: VersionState,
    ) -> LedgerResult<Memento> {
        let mut histories = self.histories.write()?;
        let history = histories.entry(identifier.as_str().to_string()).or_default();
        if let Some(latest) = history.last() {
            if at <= latest.datetime {
                return Err(LedgerError::OutOfOrder {
                    identifier: identifier.to_string(),
                    at: format_instant(&at),
                    latest: format_instant(&latest.datetime),
                });
            }
        }
        let memento = Memento::new(identifier.clone(), at, state);
        history.push(memento.clone());
        debug!(
            identifier = %identifier,
            version = %memento.version,
            deleted = memento.is_deleted(),
            "version appended"
        );
        Ok(memento)
    }

    fn timemap(&self, identifier: &NamedNode) -> LedgerResult<TimeMap> {
        let histories = self.histories.read()?;
        let history = histories
            .get(identifier.as_str())
            .ok_or_else(|| LedgerError::UnknownResource(identifier.to_string()))?;
        Ok(TimeMap {
            identifier: identifier.clone(),
            mementos: history.iter().map(MementoRef::from).collect(),
        })
    }

    fn timegate(&self, identifier: &NamedNode, accept: DateTime<Utc>) -> LedgerResult<Memento> {
        let histories = self.histories.read()?;
        let history = histories
            .get(identifier.as_str())
            .ok_or_else(|| LedgerError::UnknownResource(identifier.to_string()))?;
        // Histories are sorted, so the match is the last entry not after `accept`.
        let idx = history.partition_point(|m| m.datetime <= accept);
        if idx == 0 {
            return Err(LedgerError::NoVersionBefore {
                identifier: identifier.to_string(),
                requested: format_instant(&accept),
            });
        }
        Ok(history[idx - 1].clone())
    }

    fn memento(&self, identifier: &NamedNode, at: DateTime<Utc>) -> LedgerResult<Option<Memento>> {
        let histories = self.histories.read()?;
        Ok(histories.get(identifier.as_str()).and_then(|history| {
            history
                .binary_search_by(|m| m.datetime.cmp(&at))
                .ok()
                .map(|i| history[i].clone())
        }))
    }

    fn version_count(&self, identifier: &NamedNode) -> LedgerResult<usize> {
        let histories = self.histories.read()?;
        Ok(histories.get(identifier.as_str()).map_or(0, Vec::len))
    }
}

impl std::fmt::Debug for InMemoryVersionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVersionLog")
            .field("resources", &self.resource_count())
            .finish()
    }
}
