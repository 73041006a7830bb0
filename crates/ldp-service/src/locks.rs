//! Per-identifier locking for resource mutations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use ldp_store::StoreResult;
use ldp_types::NamedNode;

/// Per-identifier async locks.
///
/// Mutations of one identifier are serialized through its lock; unrelated
/// identifiers never contend. Callers that need several locks acquire them
/// ancestor before descendant.
pub struct LockTable {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
    prune_threshold: usize,
}

impl LockTable {
    pub fn new(prune_threshold: usize) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            prune_threshold: prune_threshold.max(1),
        }
    }

    fn entry(&self, identifier: &NamedNode) -> StoreResult<Arc<RwLock<()>>> {
        let mut locks = self.locks.lock()?;
        if locks.len() >= self.prune_threshold {
            let before = locks.len();
            // Only the table holds an idle lock.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            debug!(before, after = locks.len(), "pruned idle locks");
        }
        Ok(locks
            .entry(identifier.as_str().to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone())
    }

    /// Exclusive access to `identifier`.
    pub async fn write(&self, identifier: &NamedNode) -> StoreResult<OwnedRwLockWriteGuard<()>> {
        let lock = self.entry(identifier)?;
        Ok(lock.write_owned().await)
    }

    /// Shared access to `identifier`.
    pub async fn read(&self, identifier: &NamedNode) -> StoreResult<OwnedRwLockReadGuard<()>> {
        let lock = self.entry(identifier)?;
        Ok(lock.read_owned().await)
    }

    /// Number of identifiers currently holding a table entry.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LockTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockTable")
            .field("entries", &self.len())
            .field("prune_threshold", &self.prune_threshold)
            .finish()
    }
}
