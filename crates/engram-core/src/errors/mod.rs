//! Error taxonomy. Per-domain enums plus the aggregate `EngramError`.

mod embedding_error;
mod index_error;
mod storage_error;

pub use embedding_error::EmbeddingError;
pub use index_error::IndexError;
pub use storage_error::StoreError;

/// Aggregate error type crossing crate boundaries.
#[derive(Debug, thiserror::Error)]
pub enum EngramError {
    /// A required entity field (id/content/type) was missing or empty.
    #[error("validation failed: missing required field `{field}`")]
    Validation { field: String },

    /// An operation addressed an unknown entity id.
    #[error("entity not found: {id}")]
    NotFound { id: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type EngramResult<T> = Result<T, EngramError>;

impl EngramError {
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation { field: field.into() }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = EngramError::validation("content");
        assert_eq!(
            e.to_string(),
            "validation failed: missing required field `content`"
        );

        let e = EngramError::not_found("m1");
        assert_eq!(e.to_string(), "entity not found: m1");

        let e = EngramError::Index(IndexError::Http {
            status: 503,
            body: "overloaded".to_string(),
        });
        assert!(e.to_string().contains("503"));
    }

    #[test]
    fn store_error_converts() {
        fn fails() -> EngramResult<()> {
            Err(StoreError::Backend {
                message: "disk full".to_string(),
            })?;
            Ok(())
        }
        assert!(matches!(fails(), Err(EngramError::Store(_))));
    }
}
