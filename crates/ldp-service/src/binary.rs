//! NonRDFSource content storage, kept apart from the quad store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use ldp_store::{StoreError, StoreResult};
use ldp_types::{vocab, IdentifierSupplier, NamedNode};

/// Storage for NonRDFSource content, keyed by binary location.
///
/// Independent of the quad store: a resource only records the location and
/// MIME type of its content.
#[async_trait]
pub trait BinaryService: Send + Sync {
    /// The full content at `location`. `NotFound` if none is stored.
    async fn get(&self, location: &NamedNode) -> StoreResult<Bytes>;

    /// Bytes `from..to` of the content, clamped to its length.
    async fn get_range(&self, location: &NamedNode, from: usize, to: usize) -> StoreResult<Bytes>;

    /// Store (or overwrite) the content at `location`.
    async fn set_content(&self, location: &NamedNode, content: Bytes) -> StoreResult<()>;

    /// Remove the content at `location`. Returns `false` if there was none.
    async fn purge_content(&self, location: &NamedNode) -> StoreResult<bool>;

    /// A fresh, unused location.
    fn generate_location(&self) -> NamedNode;
}

/// `HashMap`-backed binary storage for tests and embedding.
pub struct InMemoryBinaryService {
    contents: RwLock<HashMap<String, Bytes>>,
    locations: IdentifierSupplier,
}

impl InMemoryBinaryService {
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(HashMap::new()),
            locations: IdentifierSupplier::with_prefix("urn:ldp:binary:"),
        }
    }

    pub fn len(&self) -> usize {
        self.contents.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBinaryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BinaryService for InMemoryBinaryService {
    async fn get(&self, location: &NamedNode) -> StoreResult<Bytes> {
        self.contents
            .read()?
            .get(location.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no content at {location}")))
    }

    async fn get_range(&self, location: &NamedNode, from: usize, to: usize) -> StoreResult<Bytes> {
        let content = self.get(location).await?;
        let end = to.min(content.len());
        let start = from.min(end);
        Ok(content.slice(start..end))
    }

    async fn set_content(&self, location: &NamedNode, content: Bytes) -> StoreResult<()> {
        debug!(location = %location, bytes = content.len(), "binary content stored");
        self.contents
            .write()?
            .insert(location.as_str().to_string(), content);
        Ok(())
    }

    async fn purge_content(&self, location: &NamedNode) -> StoreResult<bool> {
        let removed = self.contents.write()?.remove(location.as_str()).is_some();
        if removed {
            debug!(location = %location, "binary content purged");
        }
        Ok(removed)
    }

    fn generate_location(&self) -> NamedNode {
        vocab::iri(&self.locations.generate())
    }
}

impl std::fmt::Debug for InMemoryBinaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBinaryService")
            .field("entries", &self.len())
            .finish()
    }
}
