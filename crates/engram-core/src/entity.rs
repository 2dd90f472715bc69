use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The unit of storage. Every record in the system is an Entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Caller-supplied unique key. Immutable after creation.
    pub id: String,
    /// Free-form category discriminator (e.g. "document", "conversation").
    /// Drives the type index.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Text payload, the unit that gets embedded and chunked.
    pub content: String,
    /// System and user metadata.
    pub metadata: Metadata,
}

/// Entity metadata: named, typed system fields plus an open extension map
/// for caller-supplied fields. Keeping system fields out of the open map
/// prevents callers from shadowing `version`, `created_at`, etc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    // --- System fields, written only by the engine ---
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Monotonic, starts at 1, incremented on every update.
    pub version: u64,
    /// The version immediately prior to the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<u64>,
    /// Whether the content has been embedded and indexed.
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<DateTime<Utc>>,
    /// Cached document-level embedding, used by the brute-force fallback
    /// when no remote vector index is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    // --- User fields with first-class filter support ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Optional expiry; entities past this point are lazily removed on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Open extension map for everything else the caller supplies.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Metadata {
    /// Fresh system metadata for a newly created entity.
    pub fn stamped(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            version: 1,
            previous_version: None,
            indexed: false,
            indexed_at: None,
            embedding: None,
            category: None,
            user_id: None,
            status: None,
            priority: None,
            tags: Vec::new(),
            expires_at: None,
            extra: BTreeMap::new(),
        }
    }

    /// Whether `expires_at` is set and in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

impl Entity {
    /// Id of the i-th chunk vector derived from this entity.
    /// Chunks exist only inside the remote vector index.
    pub fn chunk_id(entity_id: &str, index: usize) -> String {
        format!("{entity_id}_chunk_{index}")
    }
}

/// Identity equality: two entities are equal if they have the same id.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Caller input for `create`. User metadata only; system fields are stamped
/// by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDraft {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Partial update for `update`. `None` fields are left untouched; the
/// `extra` map is shallow-merged over the existing one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_format() {
        assert_eq!(Entity::chunk_id("doc-1", 0), "doc-1_chunk_0");
        assert_eq!(Entity::chunk_id("doc-1", 12), "doc-1_chunk_12");
    }

    #[test]
    fn stamped_metadata_starts_at_version_one() {
        let meta = Metadata::stamped(Utc::now());
        assert_eq!(meta.version, 1);
        assert_eq!(meta.previous_version, None);
        assert!(!meta.indexed);
    }

    #[test]
    fn expiry_check() {
        let now = Utc::now();
        let mut meta = Metadata::stamped(now);
        assert!(!meta.is_expired(now));
        meta.expires_at = Some(now - chrono::Duration::seconds(1));
        assert!(meta.is_expired(now));
        meta.expires_at = Some(now + chrono::Duration::seconds(60));
        assert!(!meta.is_expired(now));
    }

    #[test]
    fn metadata_roundtrip_preserves_extra_fields() {
        let mut meta = Metadata::stamped(Utc::now());
        meta.extra
            .insert("project".to_string(), serde_json::json!("atlas"));
        let json = serde_json::to_string(&meta).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extra.get("project"), Some(&serde_json::json!("atlas")));
        assert_eq!(back.version, 1);
    }

    #[test]
    fn entity_equality_is_by_id() {
        let now = Utc::now();
        let a = Entity {
            id: "e1".to_string(),
            entity_type: "note".to_string(),
            content: "one".to_string(),
            metadata: Metadata::stamped(now),
        };
        let mut b = a.clone();
        b.content = "different".to_string();
        assert_eq!(a, b);
    }
}
