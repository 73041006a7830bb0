//! Container to child index behind `ldp:contains`.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use tracing::debug;

use ldp_store::QuadStore;
use ldp_types::vocab::{self, ldp};
use ldp_types::{Graph, NamedNode, Triple};

use crate::error::{IndexError, IndexResult};

#[derive(Default)]
struct Tables {
    /// container -> directly contained children
    children: HashMap<String, BTreeSet<String>>,
    /// child -> its single container
    parents: HashMap<String, String>,
}

/// Per-container sets of directly contained children.
///
/// Set semantics: insertion order is irrelevant and a child is listed at most
/// once. Each child has exactly one container for its whole lifetime; a
/// second `add` naming a different container is rejected.
pub struct ContainmentIndex {
    tables: RwLock<Tables>,
}

impl ContainmentIndex {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Record `child` under `container`. Returns `false` if already recorded.
    pub fn add(&self, container: &NamedNode, child: &NamedNode) -> IndexResult<bool> {
        let mut tables = self.tables.write()?;
        if let Some(existing) = tables.parents.get(child.as_str()) {
            if existing != container.as_str() {
                return Err(IndexError::AlreadyContained {
                    child: child.to_string(),
                    container: format!("<{existing}>"),
                });
            }
            return Ok(false);
        }
        tables
            .parents
            .insert(child.as_str().to_string(), container.as_str().to_string());
        tables
            .children
            .entry(container.as_str().to_string())
            .or_default()
            .insert(child.as_str().to_string());
        debug!(container = %container, child = %child, "containment added");
        Ok(true)
    }

    /// Forget `child`. Returns `false` if it was not recorded under `container`.
    pub fn remove(&self, container: &NamedNode, child: &NamedNode) -> IndexResult<bool> {
        let mut tables = self.tables.write()?;
        if tables.parents.get(child.as_str()).map(String::as_str) != Some(container.as_str()) {
            return Ok(false);
        }
        tables.parents.remove(child.as_str());
        let now_empty = match tables.children.get_mut(container.as_str()) {
            Some(set) => {
                set.remove(child.as_str());
                set.is_empty()
            }
            None => false,
        };
        if now_empty {
            tables.children.remove(container.as_str());
        }
        debug!(container = %container, child = %child, "containment removed");
        Ok(true)
    }

    /// Children of `container`, sorted by identifier.
    pub fn children(&self, container: &NamedNode) -> IndexResult<Vec<NamedNode>> {
        let tables = self.tables.read()?;
        Ok(tables
            .children
            .get(container.as_str())
            .map(|set| set.iter().map(|c| vocab::iri(c)).collect())
            .unwrap_or_default())
    }

    pub fn count(&self, container: &NamedNode) -> IndexResult<usize> {
        let tables = self.tables.read()?;
        Ok(tables
            .children
            .get(container.as_str())
            .map_or(0, BTreeSet::len))
    }

    /// The container currently holding `child`, if any.
    pub fn parent(&self, child: &NamedNode) -> IndexResult<Option<NamedNode>> {
        let tables = self.tables.read()?;
        Ok(tables.parents.get(child.as_str()).map(|p| vocab::iri(p)))
    }

    /// `(container, ldp:contains, child)` for every child.
    pub fn containment_triples(&self, container: &NamedNode) -> IndexResult<Graph> {
        let contains = vocab::iri(ldp::CONTAINS);
        Ok(self
            .children(container)?
            .into_iter()
            .map(|child| Triple::new(container.clone(), contains.clone(), child))
            .collect())
    }

    /// Discard all entries and repopulate from the live records in `store`.
    pub fn rebuild(&self, store: &dyn QuadStore) -> IndexResult<()> {
        let records = store.records()?;
        let mut fresh = Tables::default();
        for record in &records {
            if let Some(container) = &record.container {
                fresh.parents.insert(
                    record.identifier.as_str().to_string(),
                    container.as_str().to_string(),
                );
                fresh
                    .children
                    .entry(container.as_str().to_string())
                    .or_default()
                    .insert(record.identifier.as_str().to_string());
            }
        }
        let mut tables = self.tables.write()?;
        *tables = fresh;
        debug!(records = records.len(), "containment index rebuilt");
        Ok(())
    }
}

impl Default for ContainmentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContainmentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (containers, children) = self
            .tables
            .read()
            .map(|t| (t.children.len(), t.parents.len()))
            .unwrap_or((0, 0));
        f.debug_struct("ContainmentIndex")
            .field("containers", &containers)
            .field("children", &children)
            .finish()
    }
}
