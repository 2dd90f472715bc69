//! Similarity scoring for ranked retrieval.

mod similarity;

pub use similarity::cosine;
