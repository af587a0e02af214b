//! Visibility status and score

use serde::{Deserialize, Serialize};

/// How a brand shows up in one answer, strongest first
///
/// The score is a function of the status, so a stored check can never carry
/// an inconsistent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityStatus {
    /// Top or exclusive suggestion in the opening segment
    Featured,
    /// Positive or neutral mention in running prose
    Mentioned,
    /// Only appears inside a list of alternatives
    Listed,
    /// Only the brand's domain appears, in a reference section
    CitedSource,
    /// Nothing matched
    NotFound,
}

impl VisibilityStatus {
    pub const ALL: [VisibilityStatus; 5] = [
        VisibilityStatus::Featured,
        VisibilityStatus::Mentioned,
        VisibilityStatus::Listed,
        VisibilityStatus::CitedSource,
        VisibilityStatus::NotFound,
    ];

    pub fn score(&self) -> u8 {
        match self {
            VisibilityStatus::Featured => 100,
            VisibilityStatus::Mentioned => 70,
            VisibilityStatus::Listed => 40,
            VisibilityStatus::CitedSource => 30,
            VisibilityStatus::NotFound => 0,
        }
    }

    /// Anything but `NotFound` counts as visible
    pub fn is_visible(&self) -> bool {
        !matches!(self, VisibilityStatus::NotFound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityStatus::Featured => "featured",
            VisibilityStatus::Mentioned => "mentioned",
            VisibilityStatus::Listed => "listed",
            VisibilityStatus::CitedSource => "cited_source",
            VisibilityStatus::NotFound => "not_found",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisibilityStatus::Featured => "Featured",
            VisibilityStatus::Mentioned => "Mentioned",
            VisibilityStatus::Listed => "Listed",
            VisibilityStatus::CitedSource => "Cited Source",
            VisibilityStatus::NotFound => "Not Found",
        }
    }
}

impl std::fmt::Display for VisibilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for VisibilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "featured" => Ok(VisibilityStatus::Featured),
            "mentioned" => Ok(VisibilityStatus::Mentioned),
            "listed" => Ok(VisibilityStatus::Listed),
            "cited_source" => Ok(VisibilityStatus::CitedSource),
            "not_found" => Ok(VisibilityStatus::NotFound),
            other => Err(format!("Unknown visibility status: {}", other)),
        }
    }
}

/// Human band for a (possibly averaged) score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Moderate,
    Low,
    NotFound,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 40.0 {
            ScoreBand::Moderate
        } else if score >= 20.0 {
            ScoreBand::Low
        } else {
            ScoreBand::NotFound
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Moderate => "Moderate",
            ScoreBand::Low => "Low",
            ScoreBand::NotFound => "Not Found",
        }
    }
}

/// Render a score as `72/100 (Good)`
pub fn format_score(score: f64) -> String {
    format!("{:.0}/100 ({})", score, ScoreBand::from_score(score).label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_follow_priority() {
        let scores: Vec<u8> = VisibilityStatus::ALL.iter().map(|s| s.score()).collect();
        assert_eq!(scores, vec![100, 70, 40, 30, 0]);
    }

    #[test]
    fn test_only_not_found_is_invisible() {
        for status in VisibilityStatus::ALL {
            assert_eq!(status.is_visible(), status != VisibilityStatus::NotFound);
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("Cited Source".parse(), Ok(VisibilityStatus::CitedSource));
        assert_eq!("not-found".parse(), Ok(VisibilityStatus::NotFound));
        assert!("bogus".parse::<VisibilityStatus>().is_err());
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(100.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(70.0), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(40.0), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(30.0), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::NotFound);
        assert_eq!(format_score(72.4), "72/100 (Good)");
    }
}
