//! Resource service facade for the LDP resource store.
//!
//! [`ResourceService`] is the single entry point for an HTTP binding layer.
//! It validates every proposed state, writes it to a [`ldp_store::QuadStore`],
//! keeps containment and membership views current, appends Memento versions
//! and records PROV activities.
//!
//! # Quick Start
//!
//! ```rust
//! use ldp_service::{ResourceService, ServiceConfig};
//! use ldp_types::{vocab, Dataset, InteractionModel, Metadata};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = ResourceService::in_memory(ServiceConfig::default()).unwrap();
//! let root = vocab::iri("http://example.com/");
//! service
//!     .create(
//!         Metadata::builder(root.clone())
//!             .interaction_model(InteractionModel::BasicContainer)
//!             .build(),
//!         Dataset::new(),
//!     )
//!     .await
//!     .unwrap();
//! assert!(service.get(root).await.unwrap().is_present());
//! # }
//! ```
//!
//! # Ordering of a Mutation
//!
//! 1. Constraint validation; a violation leaves every partition untouched.
//! 2. The durable store write.
//! 3. Containment and membership updates.
//! 4. A version snapshot, then the audit activity.
//! 5. For child creates and deletes, the parent container and its
//!    membership resource are touched (new `modified`, version, activity).
//!
//! Nothing is versioned or audited for a write the store rejected.

pub mod binary;
pub mod config;
pub mod error;
pub mod locks;
pub mod service;

pub use binary::{BinaryService, InMemoryBinaryService};
pub use config::ServiceConfig;
pub use error::{ConfigError, ServiceError, ServiceResult};
pub use locks::LockTable;
pub use service::ResourceService;

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use chrono::{DateTime, Utc};
    use ldp_ledger::{ActivityKind, InMemoryVersionLog, LedgerError};
    use ldp_store::{InMemoryQuadStore, QuadStore, ResourceRecord, StoreError, StoreResult};
    use ldp_types::vocab::{self, dc, ldp, rdf};
    use ldp_types::{
        BinaryMetadata, ConstraintKind, Dataset, EntityTag, Graph, GraphName, InteractionModel,
        Literal, Metadata, NamedNode, Prefer, Resource, ResourceLookup, Section, Triple,
    };
    use proptest::prelude::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn iri(s: &str) -> NamedNode {
        vocab::iri(&format!("http://example.com/{s}"))
    }

    fn service() -> ResourceService {
        init_tracing();
        ResourceService::in_memory(ServiceConfig::default()).unwrap()
    }

    fn triple(s: &NamedNode, p: &str, o: &NamedNode) -> Triple {
        Triple::new(s.clone(), vocab::iri(p), o.clone())
    }

    async fn create(
        svc: &ResourceService,
        name: &str,
        model: InteractionModel,
        parent: Option<&str>,
        user: Vec<Triple>,
    ) -> StoreResult<()> {
        let mut builder = Metadata::builder(iri(name)).interaction_model(model);
        if let Some(parent) = parent {
            builder = builder.container(iri(parent));
        }
        svc.create(builder.build(), Dataset::user(user)).await
    }

    async fn fetch(svc: &ResourceService, name: &str) -> Resource {
        svc.get(iri(name))
            .await
            .unwrap()
            .into_resource()
            .unwrap_or_else(|| panic!("{name} should be live"))
    }

    fn membership_config(container: &str, member: &str, relation: &str, predicate: &str) -> Vec<Triple> {
        vec![
            triple(&iri(container), ldp::MEMBERSHIP_RESOURCE, &iri(member)),
            triple(&iri(container), relation, &vocab::iri(predicate)),
        ]
    }

    /// A root container `c` and a plain membership resource `m`.
    async fn direct_setup(svc: &ResourceService, relation: &str, predicate: &str) {
        create(svc, "m", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        create(
            svc,
            "dc",
            InteractionModel::DirectContainer,
            None,
            membership_config("dc", "m", relation, predicate),
        )
        .await
        .unwrap();
    }

    // -----------------------------------------------------------------------
    // 1. Containment
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn basic_container_containment_lifecycle() {
        let svc = service();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        create(&svc, "b/x", InteractionModel::RdfSource, Some("b"), vec![]).await.unwrap();

        let b = fetch(&svc, "b").await;
        let expected: Graph = vec![triple(&iri("b"), ldp::CONTAINS, &iri("b/x"))]
            .into_iter()
            .collect();
        assert_eq!(b.containment, expected);

        svc.delete(Metadata::builder(iri("b/x")).build()).await.unwrap();
        let b = fetch(&svc, "b").await;
        assert!(b.containment.is_empty());
        assert_eq!(svc.get(iri("b/x")).await.unwrap(), ResourceLookup::Deleted);
    }

    #[tokio::test]
    async fn deleting_a_child_removes_exactly_one_containment_triple() {
        let svc = service();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        for name in ["b/1", "b/2", "b/3"] {
            create(&svc, name, InteractionModel::RdfSource, Some("b"), vec![]).await.unwrap();
        }
        assert_eq!(fetch(&svc, "b").await.containment.len(), 3);
        svc.delete(Metadata::builder(iri("b/2")).build()).await.unwrap();
        let b = fetch(&svc, "b").await;
        assert_eq!(b.containment.len(), 2);
        assert!(!b.containment.contains(&triple(&iri("b"), ldp::CONTAINS, &iri("b/2"))));
    }

    #[tokio::test]
    async fn child_create_changes_parent_etag_and_is_audited() {
        let svc = service();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        let before = fetch(&svc, "b").await;
        create(&svc, "b/x", InteractionModel::RdfSource, Some("b"), vec![]).await.unwrap();
        let after = fetch(&svc, "b").await;
        assert_ne!(before.entity_tag(), after.entity_tag());
        assert!(after.modified > before.modified);

        let kinds: Vec<_> = svc
            .activities(iri("b"))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(kinds, vec![ActivityKind::Create, ActivityKind::Update]);
        assert_eq!(svc.timemap(iri("b")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_siblings_all_land() {
        let svc = service();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    create(
                        &svc,
                        &format!("b/{i}"),
                        InteractionModel::RdfSource,
                        Some("b"),
                        vec![],
                    )
                    .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(fetch(&svc, "b").await.containment.len(), 20);
        assert_eq!(svc.timemap(iri("b")).await.unwrap().len(), 21);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resource_cannot_contain_itself() {
        let svc = service();
        let attempt = tokio::time::timeout(
            Duration::from_secs(3),
            create(&svc, "loop", InteractionModel::BasicContainer, Some("loop"), vec![]),
        )
        .await
        .expect("self-contained create must not hang");
        assert!(matches!(attempt, Err(StoreError::Conflict(_))));
        assert_eq!(svc.get(iri("loop")).await.unwrap(), ResourceLookup::Missing);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn recursive_delete_races_child_deletes() {
        let svc = service();
        for round in 0..20 {
            let parent = format!("b{round}");
            create(&svc, &parent, InteractionModel::BasicContainer, None, vec![])
                .await
                .unwrap();
            for i in 0..10 {
                create(
                    &svc,
                    &format!("{parent}/{i}"),
                    InteractionModel::RdfSource,
                    Some(parent.as_str()),
                    vec![],
                )
                .await
                .unwrap();
            }

            let children: Vec<_> = (0..10)
                .map(|i| {
                    let svc = svc.clone();
                    let child = iri(&format!("{parent}/{i}"));
                    tokio::spawn(async move { svc.delete(Metadata::builder(child).build()).await })
                })
                .collect();
            let whole = {
                let svc = svc.clone();
                let target = iri(&parent);
                tokio::spawn(async move { svc.delete(Metadata::builder(target).build()).await })
            };

            whole.await.unwrap().unwrap();
            for handle in children {
                match handle.await.unwrap() {
                    Ok(()) | Err(StoreError::NotFound(_)) => {}
                    Err(e) => panic!("unexpected child delete failure: {e}"),
                }
            }
            assert_eq!(svc.get(iri(&parent)).await.unwrap(), ResourceLookup::Deleted);
            for i in 0..10 {
                let child = svc.get(iri(&format!("{parent}/{i}"))).await.unwrap();
                assert_eq!(child, ResourceLookup::Deleted);
            }
        }
    }

    // -----------------------------------------------------------------------
    // 2. Membership
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn direct_container_relation_change() {
        let svc = service();
        direct_setup(&svc, ldp::HAS_MEMBER_RELATION, dc::RELATION).await;
        create(&svc, "dc/x", InteractionModel::RdfSource, Some("dc"), vec![]).await.unwrap();

        let m = fetch(&svc, "m").await;
        assert!(m
            .membership_triples
            .contains(&triple(&iri("m"), dc::RELATION, &iri("dc/x"))));
        let x_before = fetch(&svc, "dc/x").await;

        svc.replace(
            Metadata::builder(iri("dc"))
                .interaction_model(InteractionModel::DirectContainer)
                .build(),
            Dataset::user(membership_config("dc", "m", ldp::HAS_MEMBER_RELATION, dc::IS_PART_OF)),
        )
        .await
        .unwrap();

        let m = fetch(&svc, "m").await;
        assert!(m
            .membership_triples
            .contains(&triple(&iri("m"), dc::IS_PART_OF, &iri("dc/x"))));
        assert!(!m
            .membership_triples
            .contains(&triple(&iri("m"), dc::RELATION, &iri("dc/x"))));

        let x_after = fetch(&svc, "dc/x").await;
        assert_eq!(x_before.entity_tag(), x_after.entity_tag());
        assert_eq!(x_before.modified, x_after.modified);
    }

    #[tokio::test]
    async fn membership_triples_follow_children() {
        let svc = service();
        direct_setup(&svc, ldp::HAS_MEMBER_RELATION, dc::RELATION).await;
        for name in ["dc/a", "dc/b"] {
            create(&svc, name, InteractionModel::RdfSource, Some("dc"), vec![]).await.unwrap();
        }
        assert_eq!(fetch(&svc, "m").await.membership_triples.len(), 2);

        svc.delete(Metadata::builder(iri("dc/a")).build()).await.unwrap();
        let m = fetch(&svc, "m").await;
        let expected: Graph = vec![triple(&iri("m"), dc::RELATION, &iri("dc/b"))]
            .into_iter()
            .collect();
        assert_eq!(m.membership_triples, expected);
    }

    #[tokio::test]
    async fn membership_resource_is_touched_and_audited() {
        let svc = service();
        direct_setup(&svc, ldp::HAS_MEMBER_RELATION, dc::RELATION).await;
        let before = fetch(&svc, "m").await;
        create(&svc, "dc/x", InteractionModel::RdfSource, Some("dc"), vec![]).await.unwrap();
        let after = fetch(&svc, "m").await;
        assert_ne!(before.entity_tag(), after.entity_tag());

        let m_kinds: Vec<_> = svc
            .activities(iri("m"))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(m_kinds, vec![ActivityKind::Create, ActivityKind::Update]);
        let dc_updates = svc
            .activities(iri("dc"))
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.kind == ActivityKind::Update)
            .count();
        assert_eq!(dc_updates, 1);
    }

    #[tokio::test]
    async fn is_member_of_relation_lives_on_the_child() {
        let svc = service();
        direct_setup(&svc, ldp::IS_MEMBER_OF_RELATION, dc::IS_PART_OF).await;
        create(&svc, "dc/x", InteractionModel::RdfSource, Some("dc"), vec![]).await.unwrap();

        let x = fetch(&svc, "dc/x").await;
        assert!(x
            .membership_triples
            .contains(&triple(&iri("dc/x"), dc::IS_PART_OF, &iri("m"))));
        assert!(fetch(&svc, "m").await.membership_triples.is_empty());
    }

    #[tokio::test]
    async fn indirect_container_uses_inserted_content() {
        let svc = service();
        let topic = "http://xmlns.com/foaf/0.1/primaryTopic";
        create(&svc, "m", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let mut config = membership_config("ic", "m", ldp::HAS_MEMBER_RELATION, dc::RELATION);
        config.push(triple(&iri("ic"), ldp::INSERTED_CONTENT_RELATION, &vocab::iri(topic)));
        create(&svc, "ic", InteractionModel::IndirectContainer, None, config)
            .await
            .unwrap();
        create(
            &svc,
            "ic/x",
            InteractionModel::RdfSource,
            Some("ic"),
            vec![triple(&iri("ic/x"), topic, &iri("ic/x#it"))],
        )
        .await
        .unwrap();

        let m = fetch(&svc, "m").await;
        assert!(m
            .membership_triples
            .contains(&triple(&iri("m"), dc::RELATION, &iri("ic/x#it"))));
        assert!(!m
            .membership_triples
            .contains(&triple(&iri("m"), dc::RELATION, &iri("ic/x"))));
    }

    #[tokio::test]
    async fn replacing_inserted_content_touches_membership_resource() {
        let svc = service();
        let topic = "http://xmlns.com/foaf/0.1/primaryTopic";
        create(&svc, "m", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let mut config = membership_config("ic", "m", ldp::HAS_MEMBER_RELATION, dc::RELATION);
        config.push(triple(&iri("ic"), ldp::INSERTED_CONTENT_RELATION, &vocab::iri(topic)));
        create(&svc, "ic", InteractionModel::IndirectContainer, None, config)
            .await
            .unwrap();
        create(
            &svc,
            "ic/x",
            InteractionModel::RdfSource,
            Some("ic"),
            vec![triple(&iri("ic/x"), topic, &iri("ic/x#it"))],
        )
        .await
        .unwrap();
        let before = fetch(&svc, "m").await;
        assert_eq!(svc.timemap(iri("m")).await.unwrap().len(), 2);

        svc.replace(
            Metadata::builder(iri("ic/x")).build(),
            Dataset::user(vec![triple(&iri("ic/x"), topic, &iri("ic/x#other"))]),
        )
        .await
        .unwrap();

        let after = fetch(&svc, "m").await;
        assert!(after
            .membership_triples
            .contains(&triple(&iri("m"), dc::RELATION, &iri("ic/x#other"))));
        assert_ne!(before.entity_tag(), after.entity_tag());
        assert_eq!(svc.timemap(iri("m")).await.unwrap().len(), 3);
        let last = svc.activities(iri("m")).await.unwrap().pop().unwrap();
        assert_eq!(last.kind, ActivityKind::Update);

        // Unrelated user triples leave the membership resource alone.
        svc.replace(
            Metadata::builder(iri("ic/x")).build(),
            Dataset::user(vec![
                triple(&iri("ic/x"), topic, &iri("ic/x#other")),
                triple(&iri("ic/x"), dc::RELATION, &iri("elsewhere")),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(svc.timemap(iri("m")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn indirect_container_requires_inserted_content_relation() {
        let svc = service();
        let err = create(
            &svc,
            "ic",
            InteractionModel::IndirectContainer,
            None,
            membership_config("ic", "m", ldp::HAS_MEMBER_RELATION, dc::RELATION),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCardinality(_)));
    }

    // -----------------------------------------------------------------------
    // 3. Validation
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn duplicate_membership_resource_is_rejected_without_side_effects() {
        let svc = service();
        let mut config = membership_config("dc", "m", ldp::HAS_MEMBER_RELATION, dc::RELATION);
        config.push(triple(&iri("dc"), ldp::MEMBERSHIP_RESOURCE, &iri("other")));
        let err = create(&svc, "dc", InteractionModel::DirectContainer, None, config)
            .await
            .unwrap_err();
        let violation = err.violation().unwrap();
        assert_eq!(violation.kind, ConstraintKind::InvalidCardinality);
        assert_eq!(violation.constraint().as_str(), vocab::trellis::INVALID_CARDINALITY);

        assert_eq!(svc.get(iri("dc")).await.unwrap(), ResourceLookup::Missing);
        assert!(matches!(
            svc.timemap(iri("dc")).await,
            Err(LedgerError::UnknownResource(_))
        ));
        assert!(svc.activities(iri("dc")).await.is_err());
    }

    #[tokio::test]
    async fn literal_type_is_invalid_range() {
        let svc = service();
        let err = create(
            &svc,
            "r",
            InteractionModel::RdfSource,
            None,
            vec![Triple::new(
                iri("r"),
                vocab::iri(rdf::TYPE),
                Literal::new_simple_literal("Some literal"),
            )],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRange(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn client_containment_is_invalid_property() {
        let svc = service();
        let err = create(
            &svc,
            "b",
            InteractionModel::BasicContainer,
            None,
            vec![triple(&iri("b"), ldp::CONTAINS, &iri("b/x"))],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidProperty(_)));
    }

    #[tokio::test]
    async fn server_managed_input_is_ignored() {
        let svc = service();
        let mut dataset = Dataset::user(vec![triple(&iri("r"), dc::RELATION, &iri("o"))]);
        dataset.insert(
            GraphName::ServerManaged,
            triple(&iri("r"), rdf::TYPE, &vocab::iri(ldp::BASIC_CONTAINER)),
        );
        dataset.insert(GraphName::Acl, triple(&iri("r"), dc::RELATION, &iri("acl")));
        svc.create(Metadata::builder(iri("r")).build(), dataset)
            .await
            .unwrap();
        let r = fetch(&svc, "r").await;
        assert_eq!(r.interaction_model, InteractionModel::RdfSource);
        assert_eq!(r.user.len(), 1);
        assert!(r.has_acl());
    }

    // -----------------------------------------------------------------------
    // 4. Create / replace / delete rules
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn create_over_live_resource_conflicts() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let err = create(&svc, "r", InteractionModel::RdfSource, None, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_creators_have_one_winner() {
        let svc = service();
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await
                })
            })
            .collect();
        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(e) => assert!(matches!(e, StoreError::Conflict(_))),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(svc.timemap(iri("r")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn parent_must_be_a_live_container() {
        let svc = service();
        let err = create(&svc, "nope/x", InteractionModel::RdfSource, Some("nope"), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let err = create(&svc, "r/x", InteractionModel::RdfSource, Some("r"), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn replace_requires_a_live_resource_of_the_same_model() {
        let svc = service();
        let err = svc
            .replace(Metadata::builder(iri("r")).build(), Dataset::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let err = svc
            .replace(
                Metadata::builder(iri("r"))
                    .interaction_model(InteractionModel::BasicContainer)
                    .build(),
                Dataset::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn stale_precondition_conflicts() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let seen = fetch(&svc, "r").await.entity_tag();

        svc.replace(
            Metadata::builder(iri("r")).expected_etag(seen.clone()).build(),
            Dataset::user(vec![triple(&iri("r"), dc::RELATION, &iri("v1"))]),
        )
        .await
        .unwrap();

        let err = svc
            .replace(
                Metadata::builder(iri("r")).expected_etag(seen.clone()).build(),
                Dataset::user(vec![triple(&iri("r"), dc::RELATION, &iri("v2"))]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = svc
            .delete(Metadata::builder(iri("r")).expected_etag(seen).build())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(svc.get(iri("r")).await.unwrap().is_present());
    }

    #[tokio::test]
    async fn delete_is_recursive_by_default() {
        let svc = service();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        create(&svc, "b/c", InteractionModel::BasicContainer, Some("b"), vec![]).await.unwrap();
        create(&svc, "b/c/x", InteractionModel::RdfSource, Some("b/c"), vec![]).await.unwrap();

        svc.delete(Metadata::builder(iri("b")).build()).await.unwrap();
        for name in ["b", "b/c", "b/c/x"] {
            assert_eq!(svc.get(iri(name)).await.unwrap(), ResourceLookup::Deleted);
            assert!(svc.timemap(iri(name)).await.unwrap().len() >= 2);
        }
    }

    #[tokio::test]
    async fn non_recursive_delete_of_non_empty_container_conflicts() {
        init_tracing();
        let config = ServiceConfig {
            recursive_delete: false,
            ..ServiceConfig::default()
        };
        let svc = ResourceService::in_memory(config).unwrap();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        create(&svc, "b/x", InteractionModel::RdfSource, Some("b"), vec![]).await.unwrap();
        let err = svc
            .delete(Metadata::builder(iri("b")).build())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        svc.delete(Metadata::builder(iri("b/x")).build()).await.unwrap();
        svc.delete(Metadata::builder(iri("b")).build()).await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_missing_or_deleted_is_not_found() {
        let svc = service();
        let err = svc.delete(Metadata::builder(iri("r")).build()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        svc.delete(Metadata::builder(iri("r")).build()).await.unwrap();
        let err = svc.delete(Metadata::builder(iri("r")).build()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn recreate_after_delete_keeps_history() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        svc.delete(Metadata::builder(iri("r")).build()).await.unwrap();
        create(&svc, "r", InteractionModel::BasicContainer, None, vec![]).await.unwrap();

        assert_eq!(fetch(&svc, "r").await.interaction_model, InteractionModel::BasicContainer);
        let map = svc.timemap(iri("r")).await.unwrap();
        assert_eq!(map.len(), 3);
        let kinds: Vec<_> = svc
            .activities(iri("r"))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::Create, ActivityKind::Delete, ActivityKind::Create]
        );
    }

    // -----------------------------------------------------------------------
    // 5. Entity tags and the audit-only path
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn etag_tracks_user_mutations_only() {
        let svc = service();
        create(&svc, "a", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        create(&svc, "b", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let a1 = fetch(&svc, "a").await.entity_tag();
        let b1 = fetch(&svc, "b").await.entity_tag();
        assert!(a1.is_weak());
        assert_eq!(fetch(&svc, "a").await.entity_tag(), a1);

        svc.replace(
            Metadata::builder(iri("a")).build(),
            Dataset::user(vec![triple(&iri("a"), dc::RELATION, &iri("o"))]),
        )
        .await
        .unwrap();
        assert_ne!(fetch(&svc, "a").await.entity_tag(), a1);
        assert_eq!(fetch(&svc, "b").await.entity_tag(), b1);
    }

    #[tokio::test]
    async fn add_appends_audit_without_versioning() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let before = fetch(&svc, "r").await;

        let mut dataset = Dataset::new();
        dataset.insert(
            GraphName::Audit,
            triple(&iri("r"), dc::RELATION, &iri("note")),
        );
        svc.add(iri("r"), dataset).await.unwrap();

        let after = fetch(&svc, "r").await;
        assert_eq!(before.entity_tag(), after.entity_tag());
        assert_eq!(before.modified, after.modified);
        assert_eq!(svc.timemap(iri("r")).await.unwrap().len(), 1);
        assert!(after
            .audit
            .contains(&triple(&iri("r"), dc::RELATION, &iri("note"))));
    }

    #[tokio::test]
    async fn add_rejects_other_graphs() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let err = svc
            .add(iri("r"), Dataset::user(vec![triple(&iri("r"), dc::RELATION, &iri("o"))]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn audit_appends_keep_activities_readable() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();

        let mut link = Dataset::new();
        link.insert(
            GraphName::Audit,
            triple(&iri("r"), vocab::prov::WAS_GENERATED_BY, &iri("note")),
        );
        svc.add(iri("r"), link).await.unwrap();
        assert_eq!(svc.activities(iri("r")).await.unwrap().len(), 1);

        // A typed activity with no time or agent would break the projection.
        let mut partial = Dataset::new();
        partial.insert(
            GraphName::Audit,
            triple(&iri("r"), vocab::prov::WAS_GENERATED_BY, &iri("half")),
        );
        partial.insert(
            GraphName::Audit,
            triple(&iri("half"), rdf::TYPE, &vocab::iri(vocab::activity_streams::UPDATE)),
        );
        let err = svc.add(iri("r"), partial).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let activities = svc.activities(iri("r")).await.unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::Create);
    }

    #[tokio::test]
    async fn audit_is_hidden_unless_requested() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let r = fetch(&svc, "r").await;
        assert!(!r.audit.is_empty());

        let default_view = r.triples(&Prefer::default());
        assert!(r.audit.iter().all(|t| !default_view.contains(t)));

        let with_audit = r.triples(&Prefer::default().include(Section::Graph(GraphName::Audit)));
        assert!(r.audit.iter().all(|t| with_audit.contains(t)));

        let omitted = r.triples(
            &Prefer::include_all().omit(Section::Graph(GraphName::Audit)),
        );
        assert!(r.audit.iter().all(|t| !omitted.contains(t)));
    }

    // -----------------------------------------------------------------------
    // 6. Audit completeness
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn every_mutation_yields_one_activity() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        for i in 0..3 {
            svc.replace(
                Metadata::builder(iri("r")).agent(iri("alice")).build(),
                Dataset::user(vec![triple(&iri("r"), dc::RELATION, &iri(&i.to_string()))]),
            )
            .await
            .unwrap();
        }
        svc.delete(Metadata::builder(iri("r")).build()).await.unwrap();

        let activities = svc.activities(iri("r")).await.unwrap();
        assert_eq!(activities.len(), 5);
        assert_eq!(activities[0].kind, ActivityKind::Create);
        assert!(activities[1..4].iter().all(|a| a.kind == ActivityKind::Update));
        assert_eq!(activities[4].kind, ActivityKind::Delete);
        assert!(activities[1..4].iter().all(|a| a.agent == iri("alice")));
        assert_eq!(activities[0].agent.as_str(), vocab::trellis::ANONYMOUS_AGENT);
        let nodes: HashSet<_> = activities.iter().map(|a| a.node.clone()).collect();
        assert_eq!(nodes.len(), 5);
    }

    #[tokio::test]
    async fn audit_can_be_disabled() {
        init_tracing();
        let config = ServiceConfig {
            audit_enabled: false,
            ..ServiceConfig::default()
        };
        let svc = ResourceService::in_memory(config).unwrap();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        assert!(svc.activities(iri("r")).await.unwrap().is_empty());
        assert_eq!(svc.timemap(iri("r")).await.unwrap().len(), 1);
    }

    // -----------------------------------------------------------------------
    // 7. Memento
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn timegate_bounds() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        svc.replace(
            Metadata::builder(iri("r")).build(),
            Dataset::user(vec![triple(&iri("r"), dc::RELATION, &iri("o"))]),
        )
        .await
        .unwrap();

        let map = svc.timemap(iri("r")).await.unwrap();
        let first: DateTime<Utc> = map.has_beginning().unwrap();
        let last = map.has_end().unwrap();
        assert!(first < last);

        let err = svc
            .timegate(iri("r"), first - chrono::Duration::seconds(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NoVersionBefore { .. }));

        let original = svc.timegate(iri("r"), first).await.unwrap();
        assert!(original.resource().unwrap().user.is_empty());

        let latest = svc
            .timegate(iri("r"), last + chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(latest.datetime, last);
        assert_eq!(latest.resource().unwrap().user.len(), 1);
        assert!(latest.resource().unwrap().audit.is_empty());
    }

    #[tokio::test]
    async fn binary_resources_have_content_and_description_versions() {
        let svc = service();
        let location = svc.binary_service().generate_location();
        svc.binary_service()
            .set_content(&location, Bytes::from_static(b"payload"))
            .await
            .unwrap();
        svc.create(
            Metadata::builder(iri("bin"))
                .interaction_model(InteractionModel::NonRdfSource)
                .binary(BinaryMetadata::new(location.as_str(), "text/plain"))
                .build(),
            Dataset::new(),
        )
        .await
        .unwrap();

        let bin = fetch(&svc, "bin").await;
        assert!(!bin.entity_tag().is_weak());
        assert!(bin.description_entity_tag().is_weak());
        assert_eq!(
            svc.get_content(iri("bin")).await.unwrap(),
            Bytes::from_static(b"payload")
        );

        let memento = svc.timegate(iri("bin"), Utc::now()).await.unwrap();
        let described_by = memento.described_by().unwrap();
        assert!(described_by.as_str().ends_with("&ext=description"));
        assert_eq!(memento.content().unwrap().identifier, location.as_str());
        assert!(memento.description().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn binary_without_location_is_rejected() {
        let svc = service();
        let err = create(&svc, "bin", InteractionModel::NonRdfSource, None, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    // -----------------------------------------------------------------------
    // 8. Identifiers and capabilities
    // -----------------------------------------------------------------------
    #[tokio::test]
    async fn thousand_identifiers_are_distinct() {
        let svc = service();
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    (0..100).map(|_| svc.generate_identifier()).collect::<Vec<_>>()
                })
            })
            .collect();
        let mut all = HashSet::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        assert_eq!(all.len(), 1000);
    }

    #[test]
    fn all_interaction_models_are_supported() {
        let svc = service();
        let models = svc.supported_interaction_models();
        assert_eq!(models.len(), 6);
        assert!(models.contains(&InteractionModel::IndirectContainer));
    }

    // -----------------------------------------------------------------------
    // 9. Failure handling
    // -----------------------------------------------------------------------

    /// Delegates to an in-memory store but fails every durable write while
    /// `failing` is set.
    struct FlakyStore {
        inner: InMemoryQuadStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreError::StorageFailure("backend unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    impl QuadStore for FlakyStore {
        fn create(&self, record: ResourceRecord) -> StoreResult<()> {
            self.check()?;
            self.inner.create(record)
        }

        fn replace(&self, record: ResourceRecord) -> StoreResult<()> {
            self.check()?;
            self.inner.replace(record)
        }

        fn delete(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<()> {
            self.check()?;
            self.inner.delete(identifier, at)
        }

        fn add(&self, identifier: &NamedNode, graph: GraphName, triples: Graph) -> StoreResult<()> {
            self.inner.add(identifier, graph, triples)
        }

        fn touch(&self, identifier: &NamedNode, at: DateTime<Utc>) -> StoreResult<bool> {
            self.inner.touch(identifier, at)
        }

        fn get(&self, identifier: &NamedNode) -> StoreResult<ResourceLookup> {
            self.inner.get(identifier)
        }

        fn audit(&self, identifier: &NamedNode) -> StoreResult<Graph> {
            self.inner.audit(identifier)
        }

        fn records(&self) -> StoreResult<Vec<ResourceRecord>> {
            self.inner.records()
        }
    }

    #[tokio::test]
    async fn failed_write_records_no_version_or_activity() {
        init_tracing();
        let store = Arc::new(FlakyStore {
            inner: InMemoryQuadStore::new(),
            failing: AtomicBool::new(false),
        });
        let svc = ResourceService::new(
            ServiceConfig::default(),
            store.clone(),
            Arc::new(InMemoryVersionLog::new()),
            Arc::new(InMemoryBinaryService::new()),
        )
        .unwrap();
        create(&svc, "b", InteractionModel::BasicContainer, None, vec![]).await.unwrap();
        let b_before = fetch(&svc, "b").await;

        store.failing.store(true, Ordering::SeqCst);
        let err = create(&svc, "b/x", InteractionModel::RdfSource, Some("b"), vec![])
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            svc.timemap(iri("b/x")).await,
            Err(LedgerError::UnknownResource(_))
        ));
        let b_after = fetch(&svc, "b").await;
        assert!(b_after.containment.is_empty());
        assert_eq!(b_before.entity_tag(), b_after.entity_tag());
        assert_eq!(svc.activities(iri("b")).await.unwrap().len(), 1);

        let err = svc
            .replace(
                Metadata::builder(iri("b"))
                    .interaction_model(InteractionModel::BasicContainer)
                    .build(),
                Dataset::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(svc.timemap(iri("b")).await.unwrap().len(), 1);

        store.failing.store(false, Ordering::SeqCst);
        create(&svc, "b/x", InteractionModel::RdfSource, Some("b"), vec![]).await.unwrap();
        assert_eq!(fetch(&svc, "b").await.containment.len(), 1);
    }

    #[tokio::test]
    async fn restart_rebuilds_derived_views() {
        init_tracing();
        let store = Arc::new(InMemoryQuadStore::new());
        let svc = ResourceService::new(
            ServiceConfig::default(),
            store.clone(),
            Arc::new(InMemoryVersionLog::new()),
            Arc::new(InMemoryBinaryService::new()),
        )
        .unwrap();
        direct_setup(&svc, ldp::HAS_MEMBER_RELATION, dc::RELATION).await;
        create(&svc, "dc/x", InteractionModel::RdfSource, Some("dc"), vec![]).await.unwrap();
        let tag = fetch(&svc, "m").await.entity_tag();

        let restarted = ResourceService::new(
            ServiceConfig::default(),
            store,
            Arc::new(InMemoryVersionLog::new()),
            Arc::new(InMemoryBinaryService::new()),
        )
        .unwrap();
        let m = fetch(&restarted, "m").await;
        assert_eq!(m.membership_triples.len(), 1);
        assert_eq!(m.entity_tag(), tag);
        assert_eq!(fetch(&restarted, "dc").await.containment.len(), 1);
    }

    #[tokio::test]
    async fn abandoned_mutation_still_completes() {
        let svc = service();
        let pending = svc.create(Metadata::builder(iri("r")).build(), Dataset::new());
        // The first poll spawns the work; dropping the future afterwards
        // must not cancel it.
        let _ = tokio::time::timeout(Duration::from_nanos(1), pending).await;
        for _ in 0..100 {
            if svc.get(iri("r")).await.unwrap().is_present() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("abandoned create never completed");
    }

    #[tokio::test]
    async fn precondition_uses_weak_comparison() {
        let svc = service();
        create(&svc, "r", InteractionModel::RdfSource, None, vec![]).await.unwrap();
        let tag = fetch(&svc, "r").await.entity_tag();
        let strong = EntityTag::strong(tag.value());
        svc.replace(
            Metadata::builder(iri("r")).expected_etag(strong).build(),
            Dataset::new(),
        )
        .await
        .unwrap();
    }

    // -----------------------------------------------------------------------
    // 10. Properties
    // -----------------------------------------------------------------------
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn membership_equals_live_children(
            names in proptest::collection::btree_set("[a-z]{1,6}", 1..8),
            removed in proptest::collection::btree_set("[a-z]{1,6}", 0..4),
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let svc = service();
                direct_setup(&svc, ldp::HAS_MEMBER_RELATION, dc::RELATION).await;
                for n in &names {
                    create(&svc, &format!("dc/{n}"), InteractionModel::RdfSource, Some("dc"), vec![])
                        .await
                        .unwrap();
                }
                for r in removed.intersection(&names) {
                    svc.delete(Metadata::builder(iri(&format!("dc/{r}"))).build())
                        .await
                        .unwrap();
                }
                let expected: Graph = names
                    .difference(&removed)
                    .map(|n| triple(&iri("m"), dc::RELATION, &iri(&format!("dc/{n}"))))
                    .collect();
                let m = fetch(&svc, "m").await;
                assert_eq!(m.membership_triples, expected);
                assert_eq!(
                    fetch(&svc, "dc").await.containment.len(),
                    names.difference(&removed).count()
                );
            });
        }
    }
}
