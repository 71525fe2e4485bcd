//! Cleanup of raw model text before it enters a transcript.

use regex::Regex;
use std::sync::LazyLock;

/// Reasoning/internal tags stripped together with their content.
const REASONING_TAGS: [&str; 8] = [
    "thinking",
    "think",
    "reflection",
    "reasoning",
    "thought",
    "scratchpad",
    "internal",
    "analysis",
];

static REASONING_RE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REASONING_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).expect("valid reasoning tag pattern")
        })
        .collect()
});

static ORPHAN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][\w-]*[^>]*>").expect("valid tag pattern"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip reasoning blocks, leftover tags, markdown emphasis and redundant
/// whitespace from a question or answer.
pub fn sanitize_response(response: &str) -> String {
    let mut result = response.to_string();

    for re in REASONING_RE.iter() {
        result = re.replace_all(&result, "").into_owned();
    }

    result = ORPHAN_TAG_RE.replace_all(&result, "").into_owned();

    result = result.replace('*', "");

    result = WHITESPACE_RE.replace_all(&result, " ").into_owned();

    result.trim().to_string()
}
