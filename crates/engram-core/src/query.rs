use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-query input, resolved into a tagged variant at the boundary rather
/// than type-sniffed inside the strategy ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryInput {
    /// Pinpoint an entity by id.
    ById { id: String },
    /// Filter by entity type.
    ByType { entity_type: String },
    /// Free-text semantic query.
    FreeText(String),
}

impl QueryInput {
    /// Text to embed when the ladder falls through to semantic search.
    /// Filter-shaped queries bake a string out of their filter text.
    pub fn as_search_text(&self) -> String {
        match self {
            Self::ById { id } => id.clone(),
            Self::ByType { entity_type } => entity_type.clone(),
            Self::FreeText(text) => text.clone(),
        }
    }
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::FreeText(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::FreeText(text)
    }
}

/// Inclusive `[start, end]` timestamp range over `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// How the synthesized answer is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStyle {
    /// Count + top score + short excerpt.
    #[default]
    Standard,
    /// ~200-character truncation of concatenated sources.
    Summary,
    /// Full concatenation of all sources.
    Detailed,
}

/// Options steering a read query. All fields participate in the cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Maximum sources returned. Default 10.
    pub limit: Option<usize>,
    /// Minimum similarity score. Defaults depend on the active backend.
    pub threshold: Option<f32>,
    pub response_style: ResponseStyle,
    /// Restrict semantic search to specific entity ids.
    pub ids: Option<Vec<String>>,
    /// Equality filters applied to semantic-search candidates.
    pub entity_type: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<String>,
    pub date_range: Option<DateRange>,
}
