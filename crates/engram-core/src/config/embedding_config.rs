use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Inference endpoint URL. Empty means the hashed fallback provider.
    pub endpoint: String,
    /// Static API key sent as a bearer token.
    pub api_key: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Input is truncated to this many characters before inference
    /// (provider constraint).
    pub max_input_chars: usize,
    /// Maximum characters per content chunk.
    pub chunk_max_chars: usize,
    /// Capacity of the in-memory embedding cache.
    pub cache_capacity: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: "@cf/baai/bge-base-en-v1.5".to_string(),
            max_input_chars: defaults::DEFAULT_MAX_INPUT_CHARS,
            chunk_max_chars: defaults::DEFAULT_CHUNK_MAX_CHARS,
            cache_capacity: defaults::DEFAULT_EMBEDDING_CACHE_CAPACITY,
        }
    }
}
