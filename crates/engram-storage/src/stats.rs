//! Sampled store analytics.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use engram_core::config::StorageConfig;
use engram_core::constants::{ENTITY_KEY_PREFIX, MAX_KEY_SCAN};
use engram_core::entity::Entity;
use engram_core::errors::EngramResult;
use engram_core::stats::StoreStats;
use engram_core::traits::IKeyValueStore;

/// Compute aggregate analytics.
///
/// When the entity population exceeds the sampling threshold, only a key
/// prefix sample is scanned and all counts are extrapolated by
/// `total / sample_size`. Callers must treat the result as an estimate
/// above the threshold (`sampled == true`).
pub(crate) fn compute(
    kv: &Arc<dyn IKeyValueStore>,
    config: &StorageConfig,
) -> EngramResult<StoreStats> {
    let keys = kv.list_keys(ENTITY_KEY_PREFIX, MAX_KEY_SCAN)?;
    let total = keys.len();
    let sampled = total > config.stats_sample_threshold;
    let sample: &[String] = if sampled {
        &keys[..config.stats_sample_threshold]
    } else {
        &keys
    };

    let mut stats = StoreStats {
        total_entities: total as u64,
        sampled,
        sample_size: sample.len() as u64,
        ..Default::default()
    };

    let now = Utc::now();
    let day_ago = now - Duration::hours(24);

    for key in sample {
        let Some(blob) = kv.get(key)? else {
            continue;
        };
        stats.total_bytes += blob.len() as u64;
        let entity: Entity = match serde_json::from_slice(&blob) {
            Ok(e) => e,
            Err(e) => {
                warn!(key, error = %e, "skipping unparsable entity in stats scan");
                continue;
            }
        };

        *stats.by_type.entry(entity.entity_type.clone()).or_default() += 1;
        if let Some(category) = &entity.metadata.category {
            *stats.by_category.entry(category.clone()).or_default() += 1;
        }
        if let Some(status) = &entity.metadata.status {
            *stats.by_status.entry(status.clone()).or_default() += 1;
        }
        if entity.metadata.indexed {
            stats.indexed += 1;
        } else {
            stats.unindexed += 1;
        }
        if entity.metadata.created_at >= day_ago {
            stats.created_last_24h += 1;
        }
        if entity.metadata.updated_at >= day_ago {
            stats.updated_last_24h += 1;
        }
    }

    if sampled && stats.sample_size > 0 {
        let scale = total as f64 / stats.sample_size as f64;
        let extrapolate = |n: u64| (n as f64 * scale).round() as u64;
        for count in stats.by_type.values_mut() {
            *count = extrapolate(*count);
        }
        for count in stats.by_category.values_mut() {
            *count = extrapolate(*count);
        }
        for count in stats.by_status.values_mut() {
            *count = extrapolate(*count);
        }
        stats.indexed = extrapolate(stats.indexed);
        stats.unindexed = extrapolate(stats.unindexed);
        stats.total_bytes = extrapolate(stats.total_bytes);
        stats.created_last_24h = extrapolate(stats.created_last_24h);
        stats.updated_last_24h = extrapolate(stats.updated_last_24h);
    }

    debug!(
        total = stats.total_entities,
        sampled = stats.sampled,
        sample = stats.sample_size,
        "stats computed"
    );
    Ok(stats)
}
