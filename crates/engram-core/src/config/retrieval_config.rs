use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum match score for remote-index results.
    pub remote_threshold: f32,
    /// Minimum match score for brute-force fallback results.
    /// Deliberately lower: document embeddings are coarser than chunk ones.
    pub fallback_threshold: f32,
    /// Default result limit for read queries.
    pub default_limit: usize,
    /// TTL for cached query results.
    pub cache_ttl_secs: u64,
    /// Pause between items in bulk operations.
    pub bulk_item_delay_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            remote_threshold: defaults::DEFAULT_REMOTE_THRESHOLD,
            fallback_threshold: defaults::DEFAULT_FALLBACK_THRESHOLD,
            default_limit: defaults::DEFAULT_READ_LIMIT,
            cache_ttl_secs: defaults::DEFAULT_CACHE_TTL_SECS,
            bulk_item_delay_ms: defaults::DEFAULT_BULK_ITEM_DELAY_MS,
        }
    }
}
