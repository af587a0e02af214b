//! Structural analysis of an answer text.
//!
//! Splits the answer into lines, tags each line as prose, list item or
//! citation, marks the opening segment, and locates every brand occurrence.
//! The classifier rules are predicates over this structure.

use crate::core::brand::Brand;
use regex::Regex;
use std::sync::LazyLock;

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d{1,3}[.)]|[-*•+])\s+\S").expect("list item pattern is a valid regex")
});

/// `Sources:` / `## References` style header, optionally followed by content
static CITATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#{1,6}\s*)?[*_]*\s*(?:sources?|references?|citations?|further reading|learn more|links)\s*[*_]*\s*(?::\s*[*_]*\s*(.*))?$",
    )
    .expect("citation header pattern is a valid regex")
});

static FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[\^?\d{1,3}\]:?\s").expect("footnote pattern is a valid regex")
});

/// Cues that present something as the top or only suggestion
static RECOMMENDATION_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:recommend(?:ed|s)?|suggest(?:ed|s)?|top|best|go with|opt for|first choice|number one|stands? out|winner|leading|clear choice|ideal choice|my pick|our pick)\b|#1\b",
    )
    .expect("recommendation cue pattern is a valid regex")
});

/// Cues that frame a mention negatively
static NEGATIVE_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:avoid|steer clear|not recommend(?:ed)?|(?:don't|do not|wouldn't|would not) recommend|instead of|worse than|lacks|poor choice|not a good|isn't a good|outdated|discontinued|unreliable)\b",
    )
    .expect("negative cue pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Prose,
    /// 1-based position within its list and the list's item count
    ListItem { position: usize, total: usize },
    Citation,
}

#[derive(Debug, Clone)]
pub struct AnswerLine {
    pub start: usize,
    pub end: usize,
    pub kind: LineKind,
    pub in_first_segment: bool,
}

/// A brand identifier found in the answer (byte offsets into the text)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

pub struct AnswerAnalysis<'a> {
    text: &'a str,
    lines: Vec<AnswerLine>,
    occurrences: Vec<Occurrence>,
}

impl<'a> AnswerAnalysis<'a> {
    pub fn new(text: &'a str, brand: &Brand) -> Self {
        let lines = split_lines(text);
        let occurrences = find_occurrences(text, &lines, &brand.identifiers());
        Self {
            text,
            lines,
            occurrences,
        }
    }

    pub fn line(&self, occurrence: &Occurrence) -> &AnswerLine {
        &self.lines[occurrence.line]
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Occurrences on prose lines
    pub fn prose_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences
            .iter()
            .filter(|o| self.line(o).kind == LineKind::Prose)
    }

    pub fn list_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences
            .iter()
            .filter(|o| matches!(self.line(o).kind, LineKind::ListItem { .. }))
    }

    pub fn citation_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences
            .iter()
            .filter(|o| self.line(o).kind == LineKind::Citation)
    }

    /// The sentence around an occurrence, bounded by its line
    pub fn sentence(&self, occurrence: &Occurrence) -> &'a str {
        let line = self.line(occurrence);
        let (start, end) = sentence_bounds(
            self.text,
            line.start,
            line.end,
            occurrence.start,
            occurrence.end,
        );
        &self.text[start..end]
    }

    /// The comma/semicolon-delimited clause around an occurrence
    pub fn clause(&self, occurrence: &Occurrence) -> &'a str {
        let line = self.line(occurrence);
        let (s_start, s_end) = sentence_bounds(
            self.text,
            line.start,
            line.end,
            occurrence.start,
            occurrence.end,
        );
        let before = &self.text[s_start..occurrence.start];
        let start = before
            .rfind([',', ';'])
            .map(|i| s_start + i + 1)
            .unwrap_or(s_start);
        let after = &self.text[occurrence.end..s_end];
        let end = after
            .find([',', ';'])
            .map(|i| occurrence.end + i)
            .unwrap_or(s_end);
        &self.text[start..end]
    }

    pub fn is_negative(&self, occurrence: &Occurrence) -> bool {
        NEGATIVE_CUE.is_match(self.clause(occurrence))
    }

    /// Prose occurrence in the opening segment whose sentence recommends it
    pub fn is_top_suggestion(&self, occurrence: &Occurrence) -> bool {
        let line = self.line(occurrence);
        line.kind == LineKind::Prose
            && line.in_first_segment
            && RECOMMENDATION_CUE.is_match(self.sentence(occurrence))
            && !self.is_negative(occurrence)
    }
}

fn split_lines(text: &str) -> Vec<AnswerLine> {
    let mut raw: Vec<(usize, usize, LineKind)> = Vec::new();
    let mut offset = 0;
    let mut in_citations = false;

    for chunk in text.split_inclusive('\n') {
        let start = offset;
        offset += chunk.len();
        let content = chunk.trim_end_matches(['\n', '\r']);
        let end = start + content.len();

        let kind = if content.trim().is_empty() {
            LineKind::Blank
        } else if in_citations || FOOTNOTE.is_match(content) {
            LineKind::Citation
        } else if let Some(caps) = CITATION_HEADER.captures(content) {
            // A bare header opens a reference section; "Source: x" is a single citation line
            if caps.get(1).is_none_or(|rest| rest.as_str().trim().is_empty()) {
                in_citations = true;
            }
            LineKind::Citation
        } else if LIST_ITEM.is_match(content) {
            LineKind::ListItem {
                position: 0,
                total: 0,
            }
        } else {
            LineKind::Prose
        };

        raw.push((start, end, kind));
    }

    number_list_items(&mut raw);

    let mut lines = Vec::with_capacity(raw.len());
    let mut segment_started = false;
    let mut segment_closed = false;
    for (start, end, kind) in raw {
        let in_first_segment = match kind {
            LineKind::Blank => {
                if segment_started {
                    segment_closed = true;
                }
                false
            }
            _ => {
                segment_started = true;
                !segment_closed
            }
        };
        lines.push(AnswerLine {
            start,
            end,
            kind,
            in_first_segment,
        });
    }
    lines
}

/// Items separated only by blank lines belong to one list
fn number_list_items(raw: &mut [(usize, usize, LineKind)]) {
    let mut group: Vec<usize> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, (_, _, kind)) in raw.iter().enumerate() {
        match kind {
            LineKind::ListItem { .. } => group.push(i),
            LineKind::Blank => {}
            LineKind::Prose | LineKind::Citation => {
                if !group.is_empty() {
                    groups.push(std::mem::take(&mut group));
                }
            }
        }
    }
    if !group.is_empty() {
        groups.push(group);
    }

    for group in groups {
        let total = group.len();
        for (position, index) in group.into_iter().enumerate() {
            raw[index].2 = LineKind::ListItem {
                position: position + 1,
                total,
            };
        }
    }
}

fn find_occurrences(text: &str, lines: &[AnswerLine], identifiers: &[String]) -> Vec<Occurrence> {
    // One scan per identifier; overlapping spans keep the longest
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for id in identifiers {
        let Ok(pattern) = Regex::new(&format!("(?i){}", regex::escape(id))) else {
            continue;
        };
        spans.extend(
            pattern
                .find_iter(text)
                .filter(|m| is_word_bounded(text, m.start(), m.end()))
                .map(|m| (m.start(), m.end())),
        );
    }

    // Leftmost first, longest at equal starts; overlaps are dropped
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut occurrences = Vec::new();
    let mut covered = 0;
    for (start, end) in spans {
        if start < covered {
            continue;
        }
        covered = end;
        if let Some(line) = lines
            .iter()
            .position(|l| start >= l.start && start <= l.end)
        {
            occurrences.push(Occurrence { start, end, line });
        }
    }
    occurrences
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn is_terminator(text: &str, index: usize, c: char) -> bool {
    matches!(c, '.' | '!' | '?')
        && text[index + c.len_utf8()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
}

fn sentence_bounds(
    text: &str,
    line_start: usize,
    line_end: usize,
    start: usize,
    end: usize,
) -> (usize, usize) {
    let sentence_start = text[line_start..start]
        .char_indices()
        .filter(|&(i, c)| is_terminator(text, line_start + i, c))
        .last()
        .map(|(i, c)| line_start + i + c.len_utf8())
        .unwrap_or(line_start);

    let sentence_end = text[end..line_end]
        .char_indices()
        .find(|&(i, c)| is_terminator(text, end + i, c))
        .map(|(i, c)| end + i + c.len_utf8())
        .unwrap_or(line_end);

    (sentence_start, sentence_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand() -> Brand {
        Brand::new("Acme").with_domain("acme.io")
    }

    #[test]
    fn test_line_kinds() {
        let text = "Here are options:\n\n1. Acme\n2. Globex\n\nAcme is solid.\n\nSources:\n- https://acme.io";
        let analysis = AnswerAnalysis::new(text, &brand());
        let kinds: Vec<LineKind> = analysis.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Prose,
                LineKind::Blank,
                LineKind::ListItem { position: 1, total: 2 },
                LineKind::ListItem { position: 2, total: 2 },
                LineKind::Blank,
                LineKind::Prose,
                LineKind::Blank,
                LineKind::Citation,
                LineKind::Citation,
            ]
        );
    }

    #[test]
    fn test_first_segment_is_first_paragraph() {
        let text = "\nAcme leads.\nStill first.\n\nLater paragraph.";
        let analysis = AnswerAnalysis::new(text, &brand());
        let flags: Vec<bool> = analysis.lines.iter().map(|l| l.in_first_segment).collect();
        assert_eq!(flags, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_occurrences_respect_word_boundaries() {
        let text = "Acmes are not Acme, but acme.io is.";
        let analysis = AnswerAnalysis::new(text, &brand());
        let found: Vec<&str> = analysis
            .occurrences()
            .iter()
            .map(|o| &text[o.start..o.end])
            .collect();
        assert_eq!(found, vec!["Acme", "acme.io"]);
    }

    #[test]
    fn test_shorter_identifier_found_when_longer_alias_is_not_a_word() {
        let brand = Brand::new("Acme").with_keyword("Acme CRM");
        let text = "Acme CRMs are popular. Acme CRM is simple.";
        let analysis = AnswerAnalysis::new(text, &brand);
        let found: Vec<&str> = analysis
            .occurrences()
            .iter()
            .map(|o| &text[o.start..o.end])
            .collect();
        assert_eq!(found, vec!["Acme", "Acme CRM"]);
    }

    #[test]
    fn test_sentence_and_clause() {
        let text = "Intro here. Avoid Globex, Acme is the best pick! Done.";
        let analysis = AnswerAnalysis::new(text, &brand());
        let occ = analysis.occurrences()[0];
        assert_eq!(analysis.sentence(&occ).trim(), "Avoid Globex, Acme is the best pick!");
        assert_eq!(analysis.clause(&occ).trim(), "Acme is the best pick!");
        assert!(!analysis.is_negative(&occ));
        assert!(analysis.is_top_suggestion(&occ));
    }

    #[test]
    fn test_inline_source_line_does_not_open_section() {
        let text = "Source: acme.io\nAcme is handy.";
        let analysis = AnswerAnalysis::new(text, &brand());
        assert_eq!(analysis.lines[0].kind, LineKind::Citation);
        assert_eq!(analysis.lines[1].kind, LineKind::Prose);
    }
}
