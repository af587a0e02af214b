//! Citation extraction
//!
//! Recognizes explicit URLs (`https://...`) and bare domain mentions with a
//! common top-level domain (`acme.io/docs`), in order of appearance.

use regex::Regex;
use std::sync::LazyLock;

static SOURCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\bhttps?://[^\s<>"'()\[\]{}]+|\b(?:www\.)?(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+(?:com|org|net|io|ai|co|dev|app|edu|gov|info|biz|me|tv|xyz|so|sh|cloud|tech|site|blog|uk|de|fr|jp|us|ca|au|in|eu|nl|se)\b(?:/[^\s<>"'()\[\]{}]*)?"#,
    )
    .expect("source pattern is a valid regex")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '*', '_', '`', '\''];

/// Every URL or domain mention in `text`, in order of first appearance.
///
/// Duplicates (compared case-insensitively) keep their first position.
/// Trailing sentence punctuation is not part of a source.
pub fn extract_cited_sources(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut sources = Vec::new();

    for m in SOURCE_PATTERN.find_iter(text) {
        let source = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if source.is_empty() {
            continue;
        }
        let key = source.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        sources.push(source.to_string());
    }

    sources
}
