//! TTL result cache over the key-value backend.
//!
//! Best-effort: every backend failure degrades to a miss or a no-op.
//! Caching accelerates queries, it never gates correctness.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use engram_core::constants::CACHE_KEY_PREFIX;
use engram_core::traits::IKeyValueStore;

/// Stored cache entry: payload plus absolute expiry.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    value: serde_json::Value,
    expires: DateTime<Utc>,
}

/// Build a cache key from an invalidation scope and a content digest.
/// The scope segment lets mutations drop every query result it covers.
pub fn cache_key(scope: &str, digest: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{scope}:{digest}")
}

/// Best-effort TTL cache for query results.
pub struct ResultCache {
    kv: Arc<dyn IKeyValueStore>,
}

impl ResultCache {
    pub fn new(kv: Arc<dyn IKeyValueStore>) -> Self {
        Self { kv }
    }

    /// Fetch a cached value. Misses on absence, expiry (the expired entry
    /// is deleted as a side effect), and any backend or decode error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let blob = match self.kv.get(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_slice(&blob) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "cache entry undecodable, treating as miss");
                return None;
            }
        };
        if entry.expires <= Utc::now() {
            debug!(key, "cache entry expired, purging");
            self.delete(key);
            return None;
        }
        serde_json::from_value(entry.value).ok()
    }

    /// Store a value for `ttl_secs`. Failures are swallowed.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let entry = match serde_json::to_value(value) {
            Ok(value) => CacheEntry {
                value,
                expires: Utc::now() + Duration::seconds(ttl_secs as i64),
            },
            Err(e) => {
                warn!(key, error = %e, "cache value unserializable, skipping");
                return;
            }
        };
        let blob = match serde_json::to_vec(&entry) {
            Ok(blob) => blob,
            Err(_) => return,
        };
        if let Err(e) = self.kv.put(key, &blob, Some(ttl_secs)) {
            warn!(key, error = %e, "cache write failed, skipping");
        }
    }

    /// Unconditional removal. Failures are swallowed.
    pub fn delete(&self, key: &str) {
        if let Err(e) = self.kv.delete(key) {
            warn!(key, error = %e, "cache delete failed, skipping");
        }
    }

    /// Drop every cached result under an invalidation scope. Called when
    /// an entity of that type/category is created, updated, or deleted.
    pub fn invalidate_scope(&self, scope: &str) {
        self.invalidate_prefix(&format!("{CACHE_KEY_PREFIX}{scope}:"));
    }

    /// Drop the entire cache. Fallback for mutations whose scopes cannot
    /// be determined, such as deleting an entity whose record no longer
    /// decodes.
    pub fn invalidate_all(&self) {
        self.invalidate_prefix(CACHE_KEY_PREFIX);
    }

    fn invalidate_prefix(&self, prefix: &str) {
        let keys = match self.kv.list_keys(prefix, engram_core::constants::MAX_KEY_SCAN) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix, error = %e, "cache listing failed, skipping");
                return;
            }
        };
        debug!(prefix, entries = keys.len(), "invalidating cache entries");
        for key in keys {
            self.delete(&key);
        }
    }
}
