//! Versioning invariants: `version` climbs by exactly 1 per update and
//! `previous_version` always names the version it replaced.

use std::sync::Arc;

use proptest::prelude::*;

use engram_core::config::EngramConfig;
use engram_core::entity::{EntityDraft, EntityPatch};
use engram_retrieval::RetrievalEngine;
use engram_storage::MemoryKv;

fn engine() -> RetrievalEngine {
    let mut config = EngramConfig::default();
    config.retrieval.bulk_item_delay_ms = 0;
    RetrievalEngine::from_config(config, Arc::new(MemoryKv::new()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn version_increments_by_one_per_update(contents in prop::collection::vec("[a-z ]{1,40}", 1..8)) {
        let engine = engine();
        let outcome = engine.create(EntityDraft {
            id: "e1".to_string(),
            entity_type: "note".to_string(),
            content: "initial content".to_string(),
            ..Default::default()
        });
        prop_assert!(outcome.success);
        prop_assert_eq!(outcome.version, Some(1));

        let mut expected = 1u64;
        for content in contents {
            let outcome = engine.update(
                "e1",
                EntityPatch { content: Some(content), ..Default::default() },
            );
            prop_assert!(outcome.success);
            expected += 1;
            prop_assert_eq!(outcome.version, Some(expected));

            let entity = engine.get_by_id("e1").unwrap().unwrap();
            prop_assert_eq!(entity.metadata.version, expected);
            prop_assert_eq!(entity.metadata.previous_version, Some(expected - 1));
        }
    }

    #[test]
    fn metadata_only_updates_also_version(statuses in prop::collection::vec("[a-z]{1,10}", 1..6)) {
        let engine = engine();
        engine.create(EntityDraft {
            id: "e1".to_string(),
            entity_type: "note".to_string(),
            content: "fixed content".to_string(),
            ..Default::default()
        });

        let mut expected = 1u64;
        for status in statuses {
            let outcome = engine.update(
                "e1",
                EntityPatch { status: Some(status), ..Default::default() },
            );
            prop_assert!(outcome.success);
            expected += 1;
            prop_assert_eq!(outcome.version, Some(expected));
        }

        let entity = engine.get_by_id("e1").unwrap().unwrap();
        prop_assert_eq!(entity.metadata.version, expected);
        prop_assert_eq!(entity.metadata.previous_version, Some(expected - 1));
        // Content never changed, so the original embedding survives.
        prop_assert!(entity.metadata.embedding.is_some());
    }
}
