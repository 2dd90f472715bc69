/// Remote vector index errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Non-2xx HTTP response from the index. Carries status and body text.
    #[error("index returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure (connect, timeout, malformed response).
    #[error("index transport error: {message}")]
    Transport { message: String },
}

impl IndexError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}
