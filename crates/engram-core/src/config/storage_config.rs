use serde::{Deserialize, Serialize};

use super::defaults;

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Retention applied to entities without an explicit `expires_at`.
    pub default_retention_secs: u64,
    /// Default result limit for filtered searches.
    pub search_limit: usize,
    /// Scan budget multiplier: at most `factor × limit` candidates are
    /// examined per search.
    pub search_scan_factor: usize,
    /// Entity count above which `stats()` samples a prefix of the
    /// population and extrapolates counts linearly.
    pub stats_sample_threshold: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_retention_secs: defaults::DEFAULT_RETENTION_SECS,
            search_limit: defaults::DEFAULT_SEARCH_LIMIT,
            search_scan_factor: defaults::DEFAULT_SEARCH_SCAN_FACTOR,
            stats_sample_threshold: defaults::DEFAULT_STATS_SAMPLE_THRESHOLD,
        }
    }
}
