/// Embedding-provider errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The inference call itself failed (transport or provider error).
    #[error("inference failed: {message}")]
    InferenceFailed { message: String },

    /// The provider responded but returned no usable vector.
    #[error("provider returned an empty vector")]
    EmptyVector,

    /// The provider is not reachable or not configured.
    #[error("provider unavailable: {provider}")]
    Unavailable { provider: String },
}

impl EmbeddingError {
    pub fn inference(message: impl Into<String>) -> Self {
        Self::InferenceFailed { message: message.into() }
    }
}
