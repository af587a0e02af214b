//! Visibility domain
//!
//! Classification of a single answer into a [`VisibilityStatus`], the
//! [`VisibilityCheck`] entity that records it, and trend helpers over
//! series of checks.

pub mod analysis;
pub mod check;
pub mod citations;
pub mod classifier;
pub mod status;
pub mod trend;

pub use check::{PeriodTag, VisibilityCheck};
pub use citations::extract_cited_sources;
pub use classifier::{classify, classify_answer, Classification, ListPosition};
pub use status::{format_score, ScoreBand, VisibilityStatus};
pub use trend::{Trend, TrendDirection};
