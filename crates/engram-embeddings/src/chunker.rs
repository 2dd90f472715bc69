//! Deterministic sentence-packing chunker.
//!
//! Pure function of its input: no provider calls, no failure modes.

/// Split `text` into chunks of at most `max_len` characters.
///
/// Text that already fits is returned unchanged as a single chunk,
/// surrounding punctuation included. Longer text is split on
/// sentence-terminal punctuation (`.`, `!`, `?`), empty fragments are
/// dropped, and sentences are greedily packed into chunks; each completed
/// chunk is re-terminated with `.`. A single sentence longer than
/// `max_len` is emitted as its own oversized chunk.
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut chunks: Vec<String> = Vec::new();
    // Joined sentences without the terminal dot, e.g. "A. B. C".
    let mut current = String::new();

    for sentence in sentences {
        let sentence_len = sentence.chars().count();

        // A sentence that cannot fit even alone gets its own chunk.
        if sentence_len + 1 > max_len {
            flush(&mut chunks, &mut current);
            chunks.push(format!("{sentence}."));
            continue;
        }

        let current_len = current.chars().count();
        let projected = if current.is_empty() {
            sentence_len + 1
        } else {
            // current + ". " + sentence + terminal "."
            current_len + 2 + sentence_len + 1
        };

        if projected > max_len {
            flush(&mut chunks, &mut current);
        }
        if !current.is_empty() {
            current.push_str(". ");
        }
        current.push_str(sentence);
    }
    flush(&mut chunks, &mut current);

    if chunks.is_empty() {
        // All-punctuation input: nothing to split on, return as-is.
        vec![text.to_string()]
    } else {
        chunks
    }
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        chunks.push(format!("{current}."));
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_returned_verbatim() {
        let text = "Hello, world!";
        assert_eq!(chunk(text, 400), vec![text.to_string()]);
    }

    #[test]
    fn exact_boundary_is_not_split() {
        let text = "a".repeat(400);
        assert_eq!(chunk(&text, 400), vec![text.clone()]);
    }

    #[test]
    fn long_text_splits_on_sentence_punctuation() {
        let text = format!("{} First point. Second point! Third point?", "x".repeat(400));
        let chunks = chunk(&text, 40);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().skip(1).all(|c| c.ends_with('.')));
    }

    #[test]
    fn packed_chunks_respect_max_len() {
        let sentences: Vec<String> = (0..30).map(|i| format!("Sentence number {i} here")).collect();
        let text = sentences.join(". ") + ".";
        for c in chunk(&text, 80) {
            assert!(c.chars().count() <= 80, "chunk too long: {c:?}");
        }
    }

    #[test]
    fn oversized_sentence_becomes_its_own_chunk() {
        let big = "w".repeat(500);
        let text = format!("Short one. {big}. Another short one.");
        let chunks = chunk(&text, 100);
        assert!(chunks.iter().any(|c| c.chars().count() > 100));
        // The oversized chunk holds exactly the oversized sentence.
        let oversized = chunks.iter().find(|c| c.chars().count() > 100).unwrap();
        assert_eq!(oversized, &format!("{big}."));
    }

    #[test]
    fn empty_fragments_are_discarded() {
        let text = format!("{}... !!! One. ?? Two.", "y".repeat(400));
        let chunks = chunk(&text, 30);
        assert!(chunks.iter().all(|c| c.chars().any(|ch| ch.is_alphanumeric())));
    }

    #[test]
    fn never_returns_empty() {
        assert!(!chunk("", 400).is_empty());
        assert!(!chunk("...", 1).is_empty());
    }
}
