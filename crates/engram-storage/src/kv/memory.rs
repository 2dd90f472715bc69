//! In-memory key-value backend. Used by tests and air-gapped setups.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use engram_core::constants::MAX_KEY_SCAN;
use engram_core::errors::{EngramResult, StoreError};
use engram_core::traits::IKeyValueStore;

struct Slot {
    value: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
}

/// BTreeMap-backed store. Prefix scans are ordered range walks; TTL is
/// honored lazily on read.
#[derive(Default)]
pub struct MemoryKv {
    slots: Mutex<BTreeMap<String, Slot>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngramResult<std::sync::MutexGuard<'_, BTreeMap<String, Slot>>> {
        self.slots
            .lock()
            .map_err(|_| StoreError::backend("memory kv mutex poisoned").into())
    }
}

impl IKeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> EngramResult<Option<Vec<u8>>> {
        let mut slots = self.lock()?;
        let expired = match slots.get(key) {
            Some(slot) => slot.expires_at.is_some_and(|at| at <= Utc::now()),
            None => return Ok(None),
        };
        if expired {
            slots.remove(key);
            return Ok(None);
        }
        Ok(slots.get(key).map(|s| s.value.clone()))
    }

    fn put(&self, key: &str, value: &[u8], ttl_secs: Option<u64>) -> EngramResult<()> {
        let expires_at = ttl_secs.map(|s| Utc::now() + Duration::seconds(s as i64));
        self.lock()?.insert(
            key.to_string(),
            Slot { value: value.to_vec(), expires_at },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> EngramResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn list_keys(&self, prefix: &str, limit: usize) -> EngramResult<Vec<String>> {
        let now = Utc::now();
        let slots = self.lock()?;
        Ok(slots
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(_, s)| !s.expires_at.is_some_and(|at| at <= now))
            .map(|(k, _)| k.clone())
            .take(limit.min(MAX_KEY_SCAN))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let kv = MemoryKv::new();
        kv.put("a", b"hello", None).unwrap();
        assert_eq!(kv.get("a").unwrap(), Some(b"hello".to_vec()));
        kv.delete("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }

    #[test]
    fn expired_key_reads_as_absent() {
        let kv = MemoryKv::new();
        kv.put("gone", b"x", Some(0)).unwrap();
        assert_eq!(kv.get("gone").unwrap(), None);
    }

    #[test]
    fn prefix_listing_is_ordered_and_bounded() {
        let kv = MemoryKv::new();
        kv.put("entity:c", b"3", None).unwrap();
        kv.put("entity:a", b"1", None).unwrap();
        kv.put("entity:b", b"2", None).unwrap();
        kv.put("other:z", b"9", None).unwrap();

        let keys = kv.list_keys("entity:", 10).unwrap();
        assert_eq!(keys, vec!["entity:a", "entity:b", "entity:c"]);

        let keys = kv.list_keys("entity:", 2).unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn delete_is_idempotent() {
        let kv = MemoryKv::new();
        kv.delete("never-existed").unwrap();
        kv.delete("never-existed").unwrap();
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn listing_returns_exactly_the_prefixed_keys_sorted(
                keys in prop::collection::btree_set("[a-z]{1,2}:[a-z]{1,4}", 0..24),
                prefix in "[a-z]{1,2}:",
            ) {
                let kv = MemoryKv::new();
                for key in &keys {
                    kv.put(key, b"v", None).unwrap();
                }

                let listed = kv.list_keys(&prefix, MAX_KEY_SCAN).unwrap();
                let expected: Vec<String> = keys
                    .iter()
                    .filter(|k| k.starts_with(&prefix))
                    .cloned()
                    .collect();
                prop_assert_eq!(listed, expected);
            }
        }
    }
}
