use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregate store analytics.
///
/// Above the sampling threshold these are extrapolated from a prefix sample
/// (`sampled == true`) and must be treated as estimates, not exact counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total entity count, exact (taken from the key listing).
    pub total_entities: u64,
    pub by_type: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
    /// Entities carrying an up-to-date embedding.
    pub indexed: u64,
    pub unindexed: u64,
    /// Serialized payload bytes across scanned entities.
    pub total_bytes: u64,
    /// Entities created within the last 24 hours.
    pub created_last_24h: u64,
    /// Entities updated within the last 24 hours.
    pub updated_last_24h: u64,
    /// Whether counts were extrapolated from a sample.
    pub sampled: bool,
    /// Number of entities actually scanned.
    pub sample_size: u64,
}
