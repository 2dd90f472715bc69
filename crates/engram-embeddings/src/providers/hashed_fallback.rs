//! Hashed term-frequency fallback provider.
//!
//! Produces deterministic dense vectors by hashing terms into
//! fixed-dimension buckets weighted by frequency. Not as semantically rich
//! as neural embeddings, but always available: no network, no model files.

use std::collections::HashMap;

use engram_core::errors::EngramResult;
use engram_core::traits::IEmbeddingProvider;

/// Deterministic local embedding provider.
pub struct HashedFallbackProvider {
    dimensions: usize,
}

impl HashedFallbackProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// FNV-1a bucket index for a term.
    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let terms = Self::terms(text);
        let mut out = vec![0.0f32; self.dimensions];
        if terms.is_empty() {
            return out;
        }

        let mut counts: HashMap<&str, f32> = HashMap::new();
        for term in &terms {
            *counts.entry(term).or_default() += 1.0;
        }

        let total = terms.len() as f32;
        for (term, count) in &counts {
            // Longer terms carry more signal than short (likely stopword) ones.
            let weight = (count / total) * (1.0 + (term.len() as f32).ln());
            out[Self::bucket(term, self.dimensions)] += weight;
        }

        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut out {
                *v /= norm;
            }
        }
        out
    }
}

impl IEmbeddingProvider for HashedFallbackProvider {
    fn embed(&self, text: &str) -> EngramResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-fallback"
    }

    fn is_available(&self) -> bool {
        true
    }
}
