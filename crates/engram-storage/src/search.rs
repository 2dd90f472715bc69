//! Filtered entity search with a bounded scan budget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use engram_core::entity::Entity;
use engram_core::query::DateRange;

/// Filters for [`crate::RecordStore::search`]. All present filters must
/// match (conjunction).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Preferred candidate source: resolves via the type index.
    pub entity_type: Option<String>,
    /// Second-choice candidate source: resolves via the category index.
    pub category: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<String>,
    /// Entity must carry every listed tag.
    pub tags: Vec<String>,
    /// Inclusive range over `created_at`.
    pub date_range: Option<DateRange>,
    /// Case-insensitive substring over content and id.
    pub text: Option<String>,
    /// Result cap. `None` uses the store's configured default.
    pub limit: Option<usize>,
}

impl SearchFilters {
    pub fn matches(&self, entity: &Entity, created_at: DateTime<Utc>) -> bool {
        // Re-checked even when the type index supplied the candidates:
        // a stale index entry must not leak a re-typed entity.
        if let Some(entity_type) = &self.entity_type {
            if entity.entity_type != *entity_type {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if entity.metadata.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if entity.metadata.status.as_deref() != Some(status.as_str()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if entity.metadata.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if !self.tags.is_empty()
            && !self.tags.iter().all(|t| entity.metadata.tags.contains(t))
        {
            return false;
        }
        if let Some(range) = &self.date_range {
            if !range.contains(created_at) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let in_content = entity.content.to_lowercase().contains(&needle);
            let in_id = entity.id.to_lowercase().contains(&needle);
            if !in_content && !in_id {
                return false;
            }
        }
        true
    }
}
