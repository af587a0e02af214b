//! String utilities for the domain layer.

/// Extract roughly `window` bytes of text centred on `start..end`.
///
/// Ellipses mark the sides that were cut. Offsets must lie on char
/// boundaries of `text`.
pub fn excerpt(text: &str, start: usize, end: usize, window: usize) -> String {
    let half = window / 2;

    let mut from = start.saturating_sub(half);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + half).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(text[from..to].trim());
    if to < text.len() {
        out.push_str("...");
    }
    out
}
