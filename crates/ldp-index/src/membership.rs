//! Membership triples derived from container configuration.
//!
//! [`MembershipResolver`] keeps a registry of Direct/Indirect container
//! configurations and, at read time, turns each container's children into
//! `hasMemberRelation` or `isMemberOfRelation` triples.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use tracing::debug;

use ldp_store::QuadStore;
use ldp_types::{vocab, Graph, MemberRelation, MembershipConfig, NamedNode, Term, Triple};

use crate::containment::ContainmentIndex;
use crate::error::IndexResult;

#[derive(Default)]
struct Registry {
    /// container -> its current membership configuration
    configs: HashMap<String, MembershipConfig>,
    /// membership resource -> containers targeting it
    targets: HashMap<String, BTreeSet<String>>,
}

/// Derives membership triples from containment plus container configuration.
///
/// Nothing here is stored as triples. Each read combines the containment
/// index, the registered configuration of every Direct/Indirect container and,
/// for Indirect containers, the child's current user-managed graph. Changing a
/// container's relation therefore changes every member triple on the next read
/// without touching any child.
pub struct MembershipResolver {
    store: Arc<dyn QuadStore>,
    containment: Arc<ContainmentIndex>,
    registry: RwLock<Registry>,
}

impl MembershipResolver {
    pub fn new(store: Arc<dyn QuadStore>, containment: Arc<ContainmentIndex>) -> Self {
        Self {
            store,
            containment,
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Set (or replace) the configuration of `container`.
    pub fn register(&self, container: &NamedNode, config: MembershipConfig) -> IndexResult<()> {
        let mut registry = self.registry.write()?;
        Self::detach(&mut registry, container.as_str());
        registry
            .targets
            .entry(config.membership_resource.as_str().to_string())
            .or_default()
            .insert(container.as_str().to_string());
        debug!(
            container = %container,
            membership_resource = %config.membership_resource,
            relation = %config.relation.predicate(),
            "membership registered"
        );
        registry
            .configs
            .insert(container.as_str().to_string(), config);
        Ok(())
    }

    /// Drop the configuration of `container`. Returns the previous one.
    pub fn unregister(&self, container: &NamedNode) -> IndexResult<Option<MembershipConfig>> {
        let mut registry = self.registry.write()?;
        let previous = Self::detach(&mut registry, container.as_str());
        if previous.is_some() {
            debug!(container = %container, "membership unregistered");
        }
        Ok(previous)
    }

    fn detach(registry: &mut Registry, container: &str) -> Option<MembershipConfig> {
        let previous = registry.configs.remove(container)?;
        let target = previous.membership_resource.as_str();
        let now_empty = match registry.targets.get_mut(target) {
            Some(set) => {
                set.remove(container);
                set.is_empty()
            }
            None => false,
        };
        if now_empty {
            registry.targets.remove(target);
        }
        Some(previous)
    }

    pub fn config(&self, container: &NamedNode) -> IndexResult<Option<MembershipConfig>> {
        Ok(self.registry.read()?.configs.get(container.as_str()).cloned())
    }

    /// Containers whose membership resource is `resource`, sorted.
    pub fn containers_targeting(&self, resource: &NamedNode) -> IndexResult<Vec<NamedNode>> {
        let registry = self.registry.read()?;
        Ok(registry
            .targets
            .get(resource.as_str())
            .map(|set| set.iter().map(|c| vocab::iri(c)).collect())
            .unwrap_or_default())
    }

    /// The member term contributed by `child`: the child itself, or the
    /// objects of `(child, insertedContentRelation, X)` in its user graph.
    fn members_of(&self, child: &NamedNode, config: &MembershipConfig) -> IndexResult<Vec<Term>> {
        if config.uses_member_subject() {
            return Ok(vec![child.clone().into()]);
        }
        let lookup = self.store.get(child)?;
        Ok(match lookup.resource() {
            Some(resource) => resource
                .user
                .objects(child, config.inserted_content_relation.as_str())
                .cloned()
                .collect(),
            None => Vec::new(),
        })
    }

    /// `(membershipResource, R, member)` for every member of `container`
    /// when it is configured with `hasMemberRelation = R`.
    pub fn member_triples(&self, container: &NamedNode) -> IndexResult<Graph> {
        let Some(config) = self.config(container)? else {
            return Ok(Graph::new());
        };
        let MemberRelation::HasMember(relation) = &config.relation else {
            return Ok(Graph::new());
        };
        let mut graph = Graph::new();
        for child in self.containment.children(container)? {
            for member in self.members_of(&child, &config)? {
                graph.insert(Triple::new(
                    config.membership_resource.clone(),
                    relation.clone(),
                    member,
                ));
            }
        }
        Ok(graph)
    }

    /// Every membership triple that lives on `resource`.
    ///
    /// That is the `hasMemberRelation` triples of each container targeting it
    /// as membership resource, plus the `isMemberOfRelation` triple pointing
    /// from it to its own container's membership resource.
    pub fn membership_triples_for(&self, resource: &NamedNode) -> IndexResult<Graph> {
        let mut graph = Graph::new();
        for container in self.containers_targeting(resource)? {
            graph.extend(self.member_triples(&container)?);
        }
        if let Some(parent) = self.containment.parent(resource)? {
            if let Some(config) = self.config(&parent)? {
                if let MemberRelation::IsMemberOf(relation) = &config.relation {
                    graph.insert(Triple::new(
                        resource.clone(),
                        relation.clone(),
                        config.membership_resource.clone(),
                    ));
                }
            }
        }
        Ok(graph)
    }

    /// Discard all registrations and repopulate from the live records.
    pub fn rebuild(&self) -> IndexResult<()> {
        let records = self.store.records()?;
        let mut fresh = Registry::default();
        for record in records {
            if let Some(config) = record.membership {
                fresh
                    .targets
                    .entry(config.membership_resource.as_str().to_string())
                    .or_default()
                    .insert(record.identifier.as_str().to_string());
                fresh
                    .configs
                    .insert(record.identifier.as_str().to_string(), config);
            }
        }
        let mut registry = self.registry.write()?;
        debug!(containers = fresh.configs.len(), "membership registry rebuilt");
        *registry = fresh;
        Ok(())
    }
}

impl std::fmt::Debug for MembershipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let containers = self.registry.read().map(|r| r.configs.len()).unwrap_or(0);
        f.debug_struct("MembershipResolver")
            .field("containers", &containers)
            .field("containment", &self.containment)
            .finish()
    }
}
