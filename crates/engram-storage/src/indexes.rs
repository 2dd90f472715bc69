//! Secondary index lists: ordered entity ids keyed by type or category.
//!
//! Updates are read-modify-write without compare-and-swap. Concurrent
//! writers touching the same index can lose a sibling's update; the read
//! paths tolerate the resulting dangling entries. Primary entity records
//! are never subject to this; each id lives under its own key.

use std::sync::Arc;

use engram_core::constants::{CATEGORY_INDEX_PREFIX, TYPE_INDEX_PREFIX};
use engram_core::errors::EngramResult;
use engram_core::traits::IKeyValueStore;

pub(crate) fn type_index_key(entity_type: &str) -> String {
    format!("{TYPE_INDEX_PREFIX}{entity_type}")
}

pub(crate) fn category_index_key(category: &str) -> String {
    format!("{CATEGORY_INDEX_PREFIX}{category}")
}

pub(crate) fn load(kv: &Arc<dyn IKeyValueStore>, key: &str) -> EngramResult<Vec<String>> {
    match kv.get(key)? {
        // A malformed index list is rebuilt empty rather than failing reads.
        Some(blob) => Ok(serde_json::from_slice(&blob).unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}

fn save(kv: &Arc<dyn IKeyValueStore>, key: &str, ids: &[String]) -> EngramResult<()> {
    kv.put(key, &serde_json::to_vec(ids)?, None)
}

/// Append `id` to the index if absent. Idempotent on duplicate calls.
pub(crate) fn append(
    kv: &Arc<dyn IKeyValueStore>,
    key: &str,
    id: &str,
) -> EngramResult<()> {
    let mut ids = load(kv, key)?;
    if ids.iter().any(|existing| existing == id) {
        return Ok(());
    }
    ids.push(id.to_string());
    save(kv, key, &ids)
}

/// Remove `id` from the index if present.
pub(crate) fn remove(
    kv: &Arc<dyn IKeyValueStore>,
    key: &str,
    id: &str,
) -> EngramResult<()> {
    let mut ids = load(kv, key)?;
    let before = ids.len();
    ids.retain(|existing| existing != id);
    if ids.len() == before {
        return Ok(());
    }
    save(kv, key, &ids)
}
