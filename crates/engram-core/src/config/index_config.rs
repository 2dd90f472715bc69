use serde::{Deserialize, Serialize};

use super::defaults;

/// Remote vector index configuration. Absent entirely when no remote index
/// is deployed; the engine then falls back to brute-force search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// Base URL of the index API.
    pub endpoint: String,
    /// Static API key sent in a header on every request.
    pub api_key: String,
    /// Optional namespace for all vectors.
    pub namespace: Option<String>,
    /// Vectors per upsert batch.
    pub batch_size: usize,
    /// Pause between upsert batches.
    pub batch_delay_ms: u64,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            namespace: None,
            batch_size: defaults::DEFAULT_UPSERT_BATCH_SIZE,
            batch_delay_ms: defaults::DEFAULT_UPSERT_BATCH_DELAY_MS,
        }
    }
}
