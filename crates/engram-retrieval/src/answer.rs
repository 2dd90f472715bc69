//! Template-based answer synthesis over ranked sources.
//!
//! Deterministic string assembly, not a generative call.

use std::sync::OnceLock;

use regex::Regex;

use engram_core::outcome::Source;
use engram_core::query::ResponseStyle;

const NOTHING_FOUND: &str = "No matching records found.";

fn meeting_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)meeting\s+(?:id\s+)?#?(\d+)").expect("meeting pattern is valid")
    })
}

/// Render an answer from ranked sources.
pub fn synthesize(query_text: &str, sources: &[Source], style: ResponseStyle) -> String {
    if sources.is_empty() {
        return NOTHING_FOUND.to_string();
    }

    if let Some(meeting_id) = meeting_pattern()
        .captures(query_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
    {
        if let Some(answer) = meeting_answer(&meeting_id, sources) {
            return answer;
        }
    }

    let combined: String = sources
        .iter()
        .filter_map(|s| s.content.as_deref())
        .collect::<Vec<_>>()
        .join(" ");

    match style {
        ResponseStyle::Summary => truncate(&combined, 200),
        ResponseStyle::Detailed => combined,
        ResponseStyle::Standard => {
            let top = &sources[0];
            format!(
                "Found {} matching record(s). Top match ({:.2}): {}",
                sources.len(),
                top.score,
                truncate(top.content.as_deref().unwrap_or(&top.id), 300),
            )
        }
    }
}

/// Structured answer for "meeting id N" queries: name the target meeting
/// plus up to three other sources as related.
fn meeting_answer(meeting_id: &str, sources: &[Source]) -> Option<String> {
    let target = sources.iter().find(|s| {
        s.id.contains(meeting_id)
            || s.content.as_deref().is_some_and(|c| c.contains(meeting_id))
    })?;

    let related: Vec<&str> = sources
        .iter()
        .filter(|s| s.id != target.id)
        .take(3)
        .map(|s| s.id.as_str())
        .collect();

    let mut answer = format!(
        "Meeting {meeting_id}: {}",
        truncate(target.content.as_deref().unwrap_or(&target.id), 200),
    );
    if !related.is_empty() {
        answer.push_str(&format!(" Related: {}.", related.join(", ")));
    }
    Some(answer)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}
