//! HTTP embedding provider: one blocking round trip per call.

use serde::{Deserialize, Serialize};
use tracing::debug;

use engram_core::config::EmbeddingConfig;
use engram_core::errors::{EmbeddingError, EngramResult};
use engram_core::traits::IEmbeddingProvider;

/// Wire request for the inference endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by a hosted inference endpoint.
///
/// Input is truncated to the configured maximum before inference (a
/// provider constraint, not a chunking decision).
pub struct HttpEmbeddingProvider {
    client: reqwest::blocking::Client,
    config: EmbeddingConfig,
    dimensions: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(config: EmbeddingConfig, dimensions: usize) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            config,
            dimensions,
        }
    }

    /// Truncate to at most `max_chars` characters, on a char boundary.
    fn truncate(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        }
    }
}

impl IEmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> EngramResult<Vec<f32>> {
        if !self.is_available() {
            return Err(EmbeddingError::Unavailable {
                provider: self.name().to_string(),
            }
            .into());
        }
        let input = Self::truncate(text, self.config.max_input_chars);
        debug!(chars = input.chars().count(), model = %self.config.model, "embedding text");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&EmbedRequest { model: &self.config.model, input })
            .send()
            .map_err(|e| EmbeddingError::inference(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbeddingError::inference(format!("HTTP {status}: {body}")).into());
        }

        let parsed: EmbedResponse = response
            .json()
            .map_err(|e| EmbeddingError::inference(e.to_string()))?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default();
        if vector.is_empty() {
            return Err(EmbeddingError::EmptyVector.into());
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }

    fn is_available(&self) -> bool {
        !self.config.endpoint.is_empty()
    }
}
