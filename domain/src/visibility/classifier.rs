//! Visibility classification
//!
//! Maps a raw answer and a brand to a [`Classification`]. Rules are evaluated
//! in priority order and the first one with evidence wins:
//!
//! | Status        | Score | Evidence                                                    |
//! |---------------|-------|-------------------------------------------------------------|
//! | Featured      | 100   | prose occurrence in the opening segment, recommended        |
//! | Mentioned     | 70    | prose occurrence without negative framing                   |
//! | Listed        | 40    | occurrence inside a list item                               |
//! | Cited Source  | 30    | occurrence inside a citation/reference section              |
//! | Not Found     | 0     | none of the above                                           |
//!
//! An answer whose only prose mentions are negative resolves to whatever the
//! remaining rules find, and to Not Found when nothing else matches.

use crate::core::brand::Brand;
use crate::core::string::excerpt;
use crate::provider::ProviderAnswer;
use crate::visibility::analysis::{AnswerAnalysis, LineKind, Occurrence};
use crate::visibility::citations::extract_cited_sources;
use crate::visibility::status::VisibilityStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};

const CONTEXT_WINDOW: usize = 200;

/// Where a listed brand sits in its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPosition {
    pub position: usize,
    pub total: usize,
}

/// Result of classifying one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: VisibilityStatus,
    pub score: u8,
    pub cited_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_position: Option<ListPosition>,
    #[serde(default)]
    pub competitors_found: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_context: Option<String>,
}

impl Classification {
    pub fn not_found() -> Self {
        Self {
            status: VisibilityStatus::NotFound,
            score: VisibilityStatus::NotFound.score(),
            cited_sources: Vec::new(),
            list_position: None,
            competitors_found: Vec::new(),
            mention_context: None,
        }
    }
}

/// One row of the rule table
pub struct VisibilityRule {
    pub status: VisibilityStatus,
    pub evidence: for<'a> fn(&AnswerAnalysis<'a>) -> Option<Occurrence>,
}

/// Rule table in priority order
pub const RULES: [VisibilityRule; 4] = [
    VisibilityRule {
        status: VisibilityStatus::Featured,
        evidence: featured_evidence,
    },
    VisibilityRule {
        status: VisibilityStatus::Mentioned,
        evidence: mentioned_evidence,
    },
    VisibilityRule {
        status: VisibilityStatus::Listed,
        evidence: listed_evidence,
    },
    VisibilityRule {
        status: VisibilityStatus::CitedSource,
        evidence: cited_evidence,
    },
];

fn featured_evidence(analysis: &AnswerAnalysis<'_>) -> Option<Occurrence> {
    analysis
        .prose_occurrences()
        .find(|o| analysis.is_top_suggestion(o))
        .copied()
}

fn mentioned_evidence(analysis: &AnswerAnalysis<'_>) -> Option<Occurrence> {
    analysis
        .prose_occurrences()
        .find(|o| !analysis.is_negative(o))
        .copied()
}

fn listed_evidence(analysis: &AnswerAnalysis<'_>) -> Option<Occurrence> {
    analysis.list_occurrences().next().copied()
}

fn cited_evidence(analysis: &AnswerAnalysis<'_>) -> Option<Occurrence> {
    analysis.citation_occurrences().next().copied()
}

/// Classify an answer text for a brand. Pure and deterministic.
pub fn classify(text: &str, brand: &Brand) -> Classification {
    if text.trim().is_empty() {
        return Classification::not_found();
    }

    let analysis = AnswerAnalysis::new(text, brand);
    let cited_sources = extract_cited_sources(text);
    let competitors_found = find_competitors(text, &brand.competitors);

    let matched = RULES
        .iter()
        .find_map(|rule| (rule.evidence)(&analysis).map(|occ| (rule.status, occ)));

    let Some((status, occurrence)) = matched else {
        return Classification {
            cited_sources,
            competitors_found,
            ..Classification::not_found()
        };
    };

    let list_position = match analysis.line(&occurrence).kind {
        LineKind::ListItem { position, total } if status == VisibilityStatus::Listed => {
            Some(ListPosition { position, total })
        }
        _ => None,
    };

    Classification {
        status,
        score: status.score(),
        cited_sources,
        list_position,
        competitors_found,
        mention_context: Some(excerpt(
            text,
            occurrence.start,
            occurrence.end,
            CONTEXT_WINDOW,
        )),
    }
}

/// Classify a provider answer; refusals are evidence of absence
pub fn classify_answer(answer: &ProviderAnswer, brand: &Brand) -> Classification {
    if answer.refused {
        return Classification::not_found();
    }
    classify(&answer.text, brand)
}

/// Competitors named in the text, in configured order
fn find_competitors(text: &str, competitors: &[String]) -> Vec<String> {
    competitors
        .iter()
        .filter(|c| !c.trim().is_empty())
        .filter(|c| {
            let pattern = format!(
                r"(?i)(?:^|[^\p{{Alphabetic}}\d]){}(?:$|[^\p{{Alphabetic}}\d])",
                regex::escape(c.trim())
            );
            Regex::new(&pattern).is_ok_and(|re| re.is_match(text))
        })
        .cloned()
        .collect()
}
