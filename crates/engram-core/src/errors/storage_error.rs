/// Storage-layer errors for key-value backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("stored payload corrupt: {details}")]
    Corruption { details: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    pub fn corruption(details: impl Into<String>) -> Self {
        Self::Corruption { details: details.into() }
    }
}
