//! Output formatter trait

use super::console::ConsoleFormatter;
use aeo_application::{
    AdvanceOutcome, CheckBatch, ExperimentRunOutcome, ExperimentStatus, VisibilitySummary,
};
use aeo_domain::{ComparisonReport, Experiment, OutputFormat, Question};
use serde::Serialize;

/// Trait for rendering command results
pub trait OutputFormatter {
    /// One check batch; `show_answers` includes each raw answer
    fn batch(&self, batch: &CheckBatch, show_answers: bool) -> String;

    fn report(&self, report: &ComparisonReport) -> String;

    fn status(&self, status: &ExperimentStatus) -> String;

    fn experiments(&self, experiments: &[Experiment]) -> String;

    /// Result of a lifecycle transition
    fn advance(&self, outcome: &AdvanceOutcome) -> String;

    fn run(&self, outcome: &ExperimentRunOutcome) -> String;

    fn summary(&self, summary: &VisibilitySummary) -> String;

    fn questions(&self, questions: &[Question]) -> String;
}

/// Pick the formatter for an output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Renders every result as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn batch(&self, batch: &CheckBatch, _show_answers: bool) -> String {
        Self::json(batch)
    }

    fn report(&self, report: &ComparisonReport) -> String {
        Self::json(report)
    }

    fn status(&self, status: &ExperimentStatus) -> String {
        Self::json(status)
    }

    fn experiments(&self, experiments: &[Experiment]) -> String {
        Self::json(experiments)
    }

    fn advance(&self, outcome: &AdvanceOutcome) -> String {
        Self::json(outcome)
    }

    fn run(&self, outcome: &ExperimentRunOutcome) -> String {
        Self::json(outcome)
    }

    fn summary(&self, summary: &VisibilitySummary) -> String {
        Self::json(summary)
    }

    fn questions(&self, questions: &[Question]) -> String {
        Self::json(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_questions() {
        let questions = vec![Question::new("What is the best CRM?")];
        let out = formatter_for(OutputFormat::Json).questions(&questions);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["text"], "What is the best CRM?");
    }
}
