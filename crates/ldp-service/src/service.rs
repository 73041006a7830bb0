use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use ldp_gate::{ConstraintValidator, Proposal};
use ldp_index::{ContainmentIndex, MembershipResolver};
use ldp_ledger::{
    Activity, ActivityKind, AuditLog, InMemoryVersionLog, LedgerError, LedgerResult, Memento,
    TimeMap, VersionState, VersionedResourceLog,
};
use ldp_store::{
    InMemoryQuadStore, QuadStore, ResourceRecord, StoreError, StoreResult, VersionClock,
};
use ldp_types::{
    Dataset, Graph, GraphName, IdentifierSupplier, InteractionModel, Metadata, NamedNode,
    ResourceLookup, Term,
};

use crate::binary::{BinaryService, InMemoryBinaryService};
use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::locks::LockTable;

// ---------------------------------------------------------------------------
// ResourceService
// ---------------------------------------------------------------------------

/// The asynchronous facade over storage, validation, derived views, history
/// and provenance.
///
/// Cloning is cheap; clones share all state. Every operation runs on its own
/// tokio task, so a mutation always runs to completion even if the caller
/// stops waiting for it.
#[derive(Clone)]
pub struct ResourceService {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServiceConfig,
    default_agent: NamedNode,
    store: Arc<dyn QuadStore>,
    versions: Arc<dyn VersionedResourceLog>,
    binaries: Arc<dyn BinaryService>,
    audit: AuditLog,
    validator: ConstraintValidator,
    containment: Arc<ContainmentIndex>,
    membership: MembershipResolver,
    locks: LockTable,
    clock: VersionClock,
    identifiers: IdentifierSupplier,
}

impl ResourceService {
    /// Build a service over existing backends. Derived indexes are rebuilt
    /// from the store's live records.
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn QuadStore>,
        versions: Arc<dyn VersionedResourceLog>,
        binaries: Arc<dyn BinaryService>,
    ) -> ServiceResult<Self> {
        config.validate()?;
        let default_agent = config.default_agent()?;
        let containment = Arc::new(ContainmentIndex::new());
        let membership = MembershipResolver::new(store.clone(), containment.clone());
        containment.rebuild(store.as_ref()).map_err(StoreError::from)?;
        membership.rebuild().map_err(StoreError::from)?;

        let clock = VersionClock::new();
        let records = store.records()?;
        if let Some(latest) = records.iter().map(|r| r.modified).max() {
            clock.observe(latest);
        }
        info!(resources = records.len(), "resource service started");

        Ok(Self {
            inner: Arc::new(Inner {
                locks: LockTable::new(config.lock_prune_threshold),
                audit: AuditLog::new(store.clone()),
                validator: ConstraintValidator::with_default_rules(),
                identifiers: IdentifierSupplier::new(),
                config,
                default_agent,
                store,
                versions,
                binaries,
                containment,
                membership,
                clock,
            }),
        })
    }

    /// A service backed entirely by in-memory components.
    pub fn in_memory(config: ServiceConfig) -> ServiceResult<Self> {
        Self::new(
            config,
            Arc::new(InMemoryQuadStore::new()),
            Arc::new(InMemoryVersionLog::new()),
            Arc::new(InMemoryBinaryService::new()),
        )
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn binary_service(&self) -> &Arc<dyn BinaryService> {
        &self.inner.binaries
    }

    async fn run<T, F, Fut>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(Arc<Inner>) -> Fut,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(op(self.inner.clone()))
            .await
            .map_err(|e| StoreError::StorageFailure(format!("operation did not complete: {e}")))?
    }

    // ---- Mutations ----

    /// Create a resource from `metadata` and the UserManaged/Acl graphs of
    /// `dataset`.
    pub async fn create(&self, metadata: Metadata, dataset: Dataset) -> StoreResult<()> {
        self.run(move |inner| async move { inner.create(metadata, dataset).await })
            .await
    }

    /// Replace the UserManaged/Acl graphs of a live resource.
    pub async fn replace(&self, metadata: Metadata, dataset: Dataset) -> StoreResult<()> {
        self.run(move |inner| async move { inner.replace(metadata, dataset).await })
            .await
    }

    /// Delete a live resource, leaving a tombstone.
    pub async fn delete(&self, metadata: Metadata) -> StoreResult<()> {
        self.run(move |inner| async move { inner.delete(metadata).await })
            .await
    }

    /// Append audit triples. Creates no version and leaves the entity tag
    /// unchanged.
    pub async fn add(&self, identifier: NamedNode, dataset: Dataset) -> StoreResult<()> {
        self.run(move |inner| async move { inner.add(identifier, dataset).await })
            .await
    }

    // ---- Reads ----

    /// Current state with containment and membership triples merged in.
    pub async fn get(&self, identifier: NamedNode) -> StoreResult<ResourceLookup> {
        self.run(move |inner| async move { inner.read(&identifier) })
            .await
    }

    /// The content of a NonRDFSource.
    pub async fn get_content(&self, identifier: NamedNode) -> StoreResult<Bytes> {
        let location = match self.get(identifier.clone()).await? {
            ResourceLookup::Present(resource) => resource
                .binary
                .map(|b| ldp_types::vocab::iri(&b.identifier))
                .ok_or_else(|| StoreError::NotFound(format!("{identifier} has no content")))?,
            _ => return Err(StoreError::NotFound(identifier.to_string())),
        };
        self.inner.binaries.get(&location).await
    }

    pub async fn timemap(&self, identifier: NamedNode) -> LedgerResult<TimeMap> {
        let inner = self.inner.clone();
        join(tokio::spawn(async move { inner.versions.timemap(&identifier) })).await
    }

    /// The version in effect at `accept`. Fails with `NoVersionBefore` when
    /// `accept` predates the first version.
    pub async fn timegate(
        &self,
        identifier: NamedNode,
        accept: DateTime<Utc>,
    ) -> LedgerResult<Memento> {
        let inner = self.inner.clone();
        join(tokio::spawn(async move { inner.versions.timegate(&identifier, accept) })).await
    }

    /// Provenance activities recorded against `identifier`, oldest first.
    pub async fn activities(&self, identifier: NamedNode) -> LedgerResult<Vec<Activity>> {
        let inner = self.inner.clone();
        join(tokio::spawn(async move { inner.audit.activities(&identifier) })).await
    }

    // ---- Capabilities ----

    /// A fresh identifier, unique across concurrent callers.
    pub fn generate_identifier(&self) -> String {
        self.inner.identifiers.generate()
    }

    pub fn supported_interaction_models(&self) -> BTreeSet<InteractionModel> {
        InteractionModel::ALL.into_iter().collect()
    }
}

async fn join<T>(handle: tokio::task::JoinHandle<LedgerResult<T>>) -> LedgerResult<T> {
    handle
        .await
        .map_err(|e| LedgerError::StorageFailure(format!("operation did not complete: {e}")))?
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("config", &self.inner.config)
            .field("containment", &self.inner.containment)
            .field("locks", &self.inner.locks)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Inner: the operations themselves
// ---------------------------------------------------------------------------

impl Inner {
    fn agent(&self, metadata: &Metadata) -> NamedNode {
        metadata
            .agent
            .clone()
            .unwrap_or_else(|| self.default_agent.clone())
    }

    /// Split a submitted dataset into its writable partitions.
    fn writable_graphs(identifier: &NamedNode, mut dataset: Dataset) -> (Graph, Graph) {
        let user = dataset.take(GraphName::UserManaged);
        let acl = dataset.take(GraphName::Acl);
        for name in dataset.graph_names().filter(|n| dataset.graph(*n).is_some_and(|g| !g.is_empty())) {
            warn!(identifier = %identifier, graph = %name, "ignoring server-derived graph in input");
        }
        (user, acl)
    }

    fn validate(&self, metadata: &Metadata, user: &Graph) -> StoreResult<()> {
        let proposal = Proposal::new(&metadata.identifier, metadata.interaction_model, user);
        self.validator.validate(&proposal)?;
        if metadata.interaction_model == InteractionModel::NonRdfSource && metadata.binary.is_none()
        {
            return Err(StoreError::Conflict(format!(
                "{} is a NonRDFSource without binary metadata",
                metadata.identifier
            )));
        }
        Ok(())
    }

    fn check_precondition(&self, metadata: &Metadata, current: &ldp_types::Resource) -> StoreResult<()> {
        if let Some(expected) = &metadata.expected_etag {
            let actual = current.entity_tag();
            if !actual.matches(expected) {
                return Err(StoreError::Conflict(format!(
                    "precondition failed for {}: expected {expected}, found {actual}",
                    metadata.identifier
                )));
            }
        }
        Ok(())
    }

    /// Resolve an identifier with its derived views merged in.
    fn read(&self, identifier: &NamedNode) -> StoreResult<ResourceLookup> {
        Ok(match self.store.get(identifier)? {
            ResourceLookup::Present(mut resource) => {
                if resource.interaction_model.is_container() {
                    resource.containment = self.containment.containment_triples(identifier)?;
                }
                resource.membership_triples = self.membership.membership_triples_for(identifier)?;
                ResourceLookup::Present(resource)
            }
            other => other,
        })
    }

    fn read_live(&self, identifier: &NamedNode) -> StoreResult<ldp_types::Resource> {
        match self.read(identifier)? {
            ResourceLookup::Present(resource) => Ok(*resource),
            ResourceLookup::Deleted => Err(StoreError::NotFound(format!("{identifier} was deleted"))),
            ResourceLookup::Missing => Err(StoreError::NotFound(format!("{identifier} does not exist"))),
        }
    }

    /// Append a version holding the state as read right now.
    fn record_version(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<()> {
        let state = match self.read(identifier)? {
            ResourceLookup::Present(mut resource) => {
                resource.audit = Graph::new();
                VersionState::Present(resource)
            }
            _ => VersionState::Deleted,
        };
        self.versions.append(identifier, at, state)?;
        Ok(())
    }

    fn record_activity(
        &self,
        identifier: &NamedNode,
        kind: ActivityKind,
        at: DateTime<Utc>,
        agent: &NamedNode,
    ) -> StoreResult<()> {
        if self.config.audit_enabled {
            self.audit.record(identifier, kind, at, agent)?;
        }
        Ok(())
    }

    /// Resources whose representation changes when a child of `container`
    /// is added or removed: the container, and its membership resource.
    fn related(&self, container: &NamedNode) -> StoreResult<Vec<NamedNode>> {
        let mut targets = vec![container.clone()];
        if let Some(config) = self.membership.config(container)? {
            if &config.membership_resource != container {
                targets.push(config.membership_resource);
            }
        }
        Ok(targets)
    }

    /// Bump `modified` on a live resource and record the change.
    async fn touch(&self, identifier: &NamedNode, agent: &NamedNode) -> StoreResult<()> {
        let _guard = self.locks.write(identifier).await?;
        let now = self.clock.now();
        if !self.store.touch(identifier, now)? {
            return Ok(());
        }
        self.record_version(identifier, now)?;
        self.record_activity(identifier, ActivityKind::Update, now, agent)?;
        debug!(identifier = %identifier, "touched by child change");
        Ok(())
    }

    async fn touch_all(&self, targets: &[NamedNode], agent: &NamedNode) -> StoreResult<()> {
        for target in targets {
            self.touch(target, agent).await?;
        }
        Ok(())
    }

    async fn create(&self, metadata: Metadata, dataset: Dataset) -> StoreResult<()> {
        let identifier = metadata.identifier.clone();
        let agent = self.agent(&metadata);
        // Containers form a forest; a resource never contains itself.
        if metadata.container.as_ref() == Some(&identifier) {
            return Err(StoreError::Conflict(format!(
                "{identifier} cannot be its own container"
            )));
        }
        let related = {
            let _parent_guard = match &metadata.container {
                Some(parent) => Some(self.locks.read(parent).await?),
                None => None,
            };
            let _guard = self.locks.write(&identifier).await?;

            let (user, acl) = Self::writable_graphs(&identifier, dataset);
            self.validate(&metadata, &user)?;
            if let Some(parent) = &metadata.container {
                let parent_resource = self.store.get(parent)?;
                match parent_resource.resource() {
                    None => {
                        return Err(StoreError::NotFound(format!(
                            "parent {parent} of {identifier} is not live"
                        )))
                    }
                    Some(p) if !p.interaction_model.is_container() => {
                        return Err(StoreError::Conflict(format!(
                            "parent {parent} is a {}, not a container",
                            p.interaction_model
                        )))
                    }
                    Some(_) => {}
                }
            }

            let now = self.clock.now();
            let record = ResourceRecord::from_metadata(&metadata, user, acl, now);
            let membership = record.membership.clone();
            self.store.create(record)?;

            if let Some(parent) = &metadata.container {
                self.containment.add(parent, &identifier)?;
            }
            if let Some(config) = membership {
                self.membership.register(&identifier, config)?;
            }
            self.record_version(&identifier, now)?;
            self.record_activity(&identifier, ActivityKind::Create, now, &agent)?;
            info!(
                identifier = %identifier,
                model = %metadata.interaction_model,
                "resource created"
            );

            match &metadata.container {
                Some(parent) => self.related(parent)?,
                None => Vec::new(),
            }
        };
        self.touch_all(&related, &agent).await
    }

    async fn replace(&self, metadata: Metadata, dataset: Dataset) -> StoreResult<()> {
        let identifier = metadata.identifier.clone();
        let agent = self.agent(&metadata);
        let related = {
            let _guard = self.locks.write(&identifier).await?;

            let (user, acl) = Self::writable_graphs(&identifier, dataset);
            let current = self.read_live(&identifier)?;
            if current.interaction_model != metadata.interaction_model {
                return Err(StoreError::Conflict(format!(
                    "{identifier} is a {}; cannot replace it as a {}",
                    current.interaction_model, metadata.interaction_model
                )));
            }
            self.check_precondition(&metadata, &current)?;
            self.validate(&metadata, &user)?;
            let inserted_moved = self.inserted_content_target(&current, &user)?;

            let now = self.clock.now();
            let mut record = ResourceRecord::from_metadata(&metadata, user, acl, now);
            // The container assignment is fixed at creation.
            record.container = current.container.clone();
            let membership = record.membership.clone();
            self.store.replace(record)?;

            let previous = match membership.clone() {
                Some(config) => {
                    let previous = self.membership.config(&identifier)?;
                    self.membership.register(&identifier, config)?;
                    previous
                }
                None => self.membership.unregister(&identifier)?,
            };
            self.record_version(&identifier, now)?;
            self.record_activity(&identifier, ActivityKind::Update, now, &agent)?;
            info!(identifier = %identifier, "resource replaced");

            // Membership resources whose derived triples moved.
            let mut related = Vec::new();
            if previous != membership {
                for config in previous.iter().chain(membership.iter()) {
                    let target = &config.membership_resource;
                    if target != &identifier && !related.contains(target) {
                        related.push(target.clone());
                    }
                }
            }
            if let Some(target) = inserted_moved {
                if target != identifier && !related.contains(&target) {
                    related.push(target);
                }
            }
            related
        };
        self.touch_all(&related, &agent).await
    }

    /// The membership resource whose triples change when `current` is
    /// replaced by `user`: set when the parent resolves members through an
    /// `insertedContentRelation` and the child's objects for it differ.
    fn inserted_content_target(
        &self,
        current: &ldp_types::Resource,
        user: &Graph,
    ) -> StoreResult<Option<NamedNode>> {
        let Some(parent) = &current.container else {
            return Ok(None);
        };
        let Some(config) = self.membership.config(parent)? else {
            return Ok(None);
        };
        if config.uses_member_subject() {
            return Ok(None);
        }
        let relation = config.inserted_content_relation.as_str();
        let before: HashSet<&Term> = current.user.objects(&current.identifier, relation).collect();
        let after: HashSet<&Term> = user.objects(&current.identifier, relation).collect();
        Ok((before != after).then_some(config.membership_resource))
    }

    async fn delete(&self, metadata: Metadata) -> StoreResult<()> {
        let identifier = metadata.identifier.clone();
        let agent = self.agent(&metadata);
        let related = {
            let _guard = self.locks.write(&identifier).await?;
            let current = self.read_live(&identifier)?;
            self.check_precondition(&metadata, &current)?;

            if current.interaction_model.is_container()
                && self.containment.count(&identifier)? > 0
            {
                if !self.config.recursive_delete {
                    return Err(StoreError::Conflict(format!(
                        "{identifier} still contains resources"
                    )));
                }
                self.delete_descendants(&identifier, &agent).await?;
            }

            self.remove(&identifier, current.container.as_ref(), &agent)?;
            info!(identifier = %identifier, "resource deleted");

            let mut related = match &current.container {
                Some(parent) => self.related(parent)?,
                None => Vec::new(),
            };
            // Its members disappear from the membership resource too.
            if let Some(target) = current.membership_resource() {
                if target != &identifier && !related.contains(target) {
                    related.push(target.clone());
                }
            }
            related
        };
        self.touch_all(&related, &agent).await
    }

    /// Delete everything beneath `root`, deepest first. The caller holds the
    /// lock on `root`; descendant locks are taken top-down before any
    /// descendant is read, so no create can slip in beneath a node being
    /// deleted.
    async fn delete_descendants(&self, root: &NamedNode, agent: &NamedNode) -> StoreResult<()> {
        let mut guards = Vec::new();
        let mut order: Vec<(NamedNode, NamedNode)> = Vec::new();
        let mut frontier: Vec<(NamedNode, NamedNode)> = self
            .containment
            .children(root)?
            .into_iter()
            .map(|child| (child, root.clone()))
            .collect();
        while let Some((node, parent)) = frontier.pop() {
            let guard = self.locks.write(&node).await?;
            // A concurrent delete may have retired the node before its lock
            // was ours.
            let live = self.store.get(&node)?.is_present();
            if !live || self.containment.parent(&node)?.as_ref() != Some(&parent) {
                debug!(identifier = %node, "descendant already gone");
                continue;
            }
            guards.push(guard);
            frontier.extend(
                self.containment
                    .children(&node)?
                    .into_iter()
                    .map(|child| (child, node.clone())),
            );
            order.push((node, parent));
        }
        // Reversed pre-order visits every node after all of its descendants.
        for (node, parent) in order.iter().rev() {
            self.remove(node, Some(parent), agent)?;
        }
        debug!(root = %root, count = order.len(), "descendants deleted");
        Ok(())
    }

    /// Tombstone one resource and retire it from every derived view.
    fn remove(
        &self,
        identifier: &NamedNode,
        container: Option<&NamedNode>,
        agent: &NamedNode,
    ) -> StoreResult<()> {
        let now = self.clock.now();
        self.store.delete(identifier, now)?;
        if let Some(parent) = container {
            self.containment.remove(parent, identifier)?;
        }
        self.membership.unregister(identifier)?;
        self.versions.append(identifier, now, VersionState::Deleted)?;
        self.record_activity(identifier, ActivityKind::Delete, now, agent)?;
        Ok(())
    }

    async fn add(&self, identifier: NamedNode, mut dataset: Dataset) -> StoreResult<()> {
        let _guard = self.locks.write(&identifier).await?;
        let audit = dataset.take(GraphName::Audit);
        if let Some((name, _)) = dataset.iter().next() {
            return Err(StoreError::Conflict(format!(
                "only the audit graph accepts appends, got {name}"
            )));
        }
        if audit.is_empty() {
            return Ok(());
        }
        // The appended triples must leave the activity projection readable.
        let mut combined = self.store.audit(&identifier)?;
        combined.extend(audit.iter().cloned());
        if let Err(e) = AuditLog::project(&combined, &identifier) {
            return Err(StoreError::Conflict(format!(
                "audit append for {identifier} rejected: {e}"
            )));
        }
        let count = audit.len();
        self.store.add(&identifier, GraphName::Audit, audit)?;
        debug!(identifier = %identifier, triples = count, "audit triples appended");
        Ok(())
    }
}
