//! Property tests: chunking is total, bounded, and content-preserving.

use proptest::prelude::*;

use engram_embeddings::chunk;

/// Strip everything the chunker may add or drop: terminal punctuation and
/// whitespace. What remains is the sentence content.
fn content_only(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '.' | '!' | '?') && !c.is_whitespace())
        .collect()
}

proptest! {
    #[test]
    fn prop_chunk_is_never_empty(text in ".{0,2000}") {
        prop_assert!(!chunk(&text, 400).is_empty());
    }

    #[test]
    fn prop_chunks_respect_max_len_for_sentence_text(
        sentences in prop::collection::vec("[a-zA-Z ]{5,60}", 1..40),
        max_len in 80usize..400,
    ) {
        let text = sentences.join(". ") + ".";
        for c in chunk(&text, max_len) {
            // No single sentence exceeds 60 chars, so every chunk is bounded.
            prop_assert!(c.chars().count() <= max_len, "chunk too long: {c:?}");
        }
    }

    #[test]
    fn prop_concatenation_reconstructs_content(
        sentences in prop::collection::vec("[a-zA-Z][a-zA-Z ]{4,60}", 1..30),
    ) {
        let text = sentences.join(". ") + ".";
        let chunks = chunk(&text, 100);
        let original = content_only(&text);
        let rebuilt: String = chunks.iter().map(|c| content_only(c)).collect();
        prop_assert_eq!(original, rebuilt);
    }

    #[test]
    fn prop_short_input_is_identity(text in ".{0,100}") {
        let n = text.chars().count();
        let chunks = chunk(&text, n.max(1));
        prop_assert_eq!(chunks, vec![text]);
    }
}
