//! Plain result objects handed back to the caller. Expected failure modes
//! are folded into these; no error crosses the library boundary from the
//! CRUD and read entry points.

use serde::{Deserialize, Serialize};

use crate::stats::StoreStats;

/// Which rung of the strategy ladder produced a read result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    DirectLookup,
    TypeFilter,
    /// Remote-index semantic search.
    Semantic,
    /// Brute-force in-store semantic search.
    SemanticFallback,
    /// Served from the result cache.
    Cached,
}

/// One ranked source backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub score: f32,
}

/// Result of a read query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadOutcome {
    pub success: bool,
    pub answer: String,
    pub sources: Vec<Source>,
    pub strategy: Strategy,
    pub confidence: f32,
}

impl ReadOutcome {
    pub fn not_found(answer: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            success: false,
            answer: answer.into(),
            sources: Vec::new(),
            strategy,
            confidence: 0.0,
        }
    }
}

/// Result of a create/update/delete call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    pub message: String,
}

impl MutationOutcome {
    pub fn ok(id: impl Into<String>, version: u64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
            version: Some(version),
            message: message.into(),
        }
    }

    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            id: id.into(),
            version: None,
            message: message.into(),
        }
    }
}

/// Result of a bulk operation: one outcome per item, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub results: Vec<MutationOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkOutcome {
    pub fn from_results(results: Vec<MutationOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        Self { results, succeeded, failed }
    }
}

/// Result of an analytics call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StoreStats>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_outcome_counts() {
        let outcome = BulkOutcome::from_results(vec![
            MutationOutcome::ok("a", 1, "created"),
            MutationOutcome::failed("b", "missing content"),
            MutationOutcome::ok("c", 1, "created"),
        ]);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.results.len(), 3);
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::DirectLookup).unwrap();
        assert_eq!(json, r#""direct_lookup""#);
        let json = serde_json::to_string(&Strategy::SemanticFallback).unwrap();
        assert_eq!(json, r#""semantic_fallback""#);
    }
}
