//! Engine configuration, one struct per subsystem.

pub mod defaults;

mod embedding_config;
mod index_config;
mod retrieval_config;
mod storage_config;

pub use embedding_config::EmbeddingConfig;
pub use index_config::VectorIndexConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngramConfig {
    pub embedding: EmbeddingConfig,
    /// `None` means no remote vector index; the engine uses the
    /// brute-force in-store fallback.
    pub index: Option<VectorIndexConfig>,
    pub retrieval: RetrievalConfig,
    pub storage: StorageConfig,
}
