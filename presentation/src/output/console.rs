//! Console output formatter for check batches, experiments and summaries

use crate::output::formatter::OutputFormatter;
use aeo_application::{
    AdvanceOutcome, CheckBatch, ExperimentRunOutcome, ExperimentStatus, VisibilitySummary,
};
use aeo_domain::{
    format_score, ComparisonReport, ConfidenceLevel, Experiment, PeriodMetrics, Question,
    TrendDirection, VisibilityCheck, VisibilityStatus,
};
use chrono::{DateTime, Duration, Utc};
use colored::{ColoredString, Colorize};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one check batch
    pub fn format_batch(batch: &CheckBatch, show_answers: bool) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Visibility Check"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Brand:".cyan().bold(), batch.brand));
        output.push_str(&format!("{} {}\n", "Question:".cyan().bold(), batch.question));

        output.push_str(&Self::section_header("Providers"));
        for check in &batch.checks {
            output.push_str(&Self::check_line(check));
            if show_answers && let Some(answer) = &check.raw_answer {
                output.push_str(&format!("{}\n", Self::indent(answer, "      │ ").dimmed()));
            }
        }
        for failure in &batch.failures {
            output.push_str(&format!(
                "  {} {:<10} {} {}\n",
                "x".red(),
                failure.provider.to_string(),
                failure.kind.to_string().red(),
                failure.detail.dimmed()
            ));
        }
        for provider in &batch.abandoned {
            output.push_str(&format!(
                "  {} {:<10} {}\n",
                "-".yellow(),
                provider.to_string(),
                "abandoned".yellow()
            ));
        }

        if !batch.checks.is_empty() {
            let mean = batch.checks.iter().map(|c| f64::from(c.score)).sum::<f64>()
                / batch.checks.len() as f64;
            output.push_str(&format!(
                "\n{} {}\n",
                "Average:".cyan().bold(),
                format_score(mean)
            ));
        }
        if batch.cancelled {
            output.push_str(&format!("{}\n", "Cancelled: partial results shown".yellow()));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a comparison report
    pub fn format_report(report: &ComparisonReport) -> String {
        let mut output = String::new();

        let title = if report.interim {
            "Experiment Report (interim)"
        } else {
            "Experiment Report"
        };
        output.push_str(&Self::header(title));
        output.push('\n');
        output.push_str(&format!(
            "{} {} ({})\n",
            "Experiment:".cyan().bold(),
            report.experiment_name,
            report.experiment_id.short()
        ));
        output.push_str(&format!("{} {}\n", "Brand:".cyan().bold(), report.brand));
        output.push_str(&format!("{} {}\n", "Hypothesis:".cyan().bold(), report.hypothesis));
        output.push_str(&format!(
            "{} {} → {}\n",
            "Control:".cyan().bold(),
            Self::date(report.control_window.start),
            Self::date(report.control_window.end)
        ));
        output.push_str(&format!(
            "{} {} → {}\n",
            "Test:".cyan().bold(),
            Self::date(report.test_window.start),
            Self::date(report.test_window.end)
        ));

        output.push_str(&Self::section_header("Results"));
        output.push_str(&format!(
            "  {:<18} {:>10} {:>10} {:>10}\n",
            "", "Control", "Test", "Change"
        ));
        output.push_str(&format!(
            "  {:<18} {:>10} {:>10} {:>10}\n",
            "Checks", report.control.checks, report.test.checks, ""
        ));
        output.push_str(&format!(
            "  {:<18} {:>10.1} {:>10.1} {}\n",
            "Mean score",
            report.control.mean_score,
            report.test.mean_score,
            Self::signed(report.delta.mean_score, "")
        ));
        output.push_str(&format!(
            "  {:<18} {:>9.1}% {:>9.1}% {}\n",
            "Visibility rate",
            report.control.visibility_rate * 100.0,
            report.test.visibility_rate * 100.0,
            Self::signed(report.delta.visibility_rate * 100.0, "pp")
        ));
        output.push_str(&format!(
            "  {:<18} {:>9.1}% {:>9.1}% {}\n",
            "Featured rate",
            report.control.featured_rate * 100.0,
            report.test.featured_rate * 100.0,
            Self::signed(report.delta.featured_rate * 100.0, "pp")
        ));

        if !report.by_provider.is_empty() {
            output.push_str(&Self::section_header("By Provider"));
            for row in &report.by_provider {
                output.push_str(&format!(
                    "  {:<18} {:>10.1} {:>10.1} {}  ({} / {} checks)\n",
                    row.provider.to_string(),
                    row.control_mean,
                    row.test_mean,
                    Self::signed(row.change, ""),
                    row.control_checks,
                    row.test_checks
                ));
            }
        }

        output.push_str(&Self::section_header("Significance"));
        match &report.significance {
            Some(sig) => {
                let verdict = if sig.is_significant() {
                    "significant".green().bold()
                } else {
                    "not significant".yellow()
                };
                output.push_str(&format!(
                    "  z = {:.3}, p = {:.4} → {} ({} confidence)\n",
                    sig.z_score,
                    sig.p_value,
                    verdict,
                    Self::confidence(sig.level)
                ));
            }
            None => {
                output.push_str(&format!("  {}\n", "not computed".dimmed()));
            }
        }

        if !report.caveats.is_empty() {
            output.push_str(&format!("\n{}\n", "Caveats:".yellow().bold()));
            for caveat in &report.caveats {
                output.push_str(&format!("  * {}\n", caveat.message()));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format one experiment with its current period
    pub fn format_status(status: &ExperimentStatus) -> String {
        let experiment = &status.experiment;
        let mut output = Self::experiment_block(experiment);

        if let Some(period) = status.period {
            let elapsed = status
                .elapsed()
                .map(Self::duration)
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "{} {} period, running for {}\n",
                "Now:".cyan().bold(),
                period,
                elapsed
            ));
        }
        if let Some(gap) = status.dormant_gap_secs {
            output.push_str(&format!(
                "{} {}\n",
                "Gap between periods:".cyan().bold(),
                Self::duration(Duration::seconds(gap))
            ));
        }
        output
    }

    /// Format the experiment list
    pub fn format_experiments(experiments: &[Experiment]) -> String {
        if experiments.is_empty() {
            return format!("{}\n", "No experiments yet.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&format!(
            "{:<10} {:<18} {:<14} {:<12} {}\n",
            "ID".bold(),
            "STATE".bold(),
            "BRAND".bold(),
            "CREATED".bold(),
            "NAME".bold()
        ));
        for experiment in experiments {
            output.push_str(&format!(
                "{:<10} {:<18} {:<14} {:<12} {}\n",
                experiment.id.short(),
                Self::state(experiment.state.as_str()),
                experiment.brand.name,
                Self::date(experiment.created_at),
                experiment.name
            ));
        }
        output
    }

    /// Format the result of a lifecycle transition
    pub fn format_advance(outcome: &AdvanceOutcome) -> String {
        let mut output = format!(
            "{} Experiment {} is now {}\n",
            "v".green(),
            outcome.experiment.id.short(),
            Self::state(outcome.experiment.state.as_str())
        );
        if let Some(report) = &outcome.report {
            output.push('\n');
            output.push_str(&Self::format_report(report));
        }
        if let Some(error) = &outcome.report_error {
            output.push_str(&format!(
                "{} Report unavailable: {}\n  Retry with `aeo-tracker experiment report {}`\n",
                "!".yellow(),
                error,
                outcome.experiment.id
            ));
        }
        output
    }

    /// Format an experiment check run
    pub fn format_run(outcome: &ExperimentRunOutcome) -> String {
        let mut output = String::new();
        for batch in &outcome.batches {
            output.push_str(&Self::format_batch(batch, false));
        }
        output.push_str(&format!(
            "\n{} {} {} checks recorded for experiment {}\n",
            if outcome.cancelled { "-".yellow() } else { "v".green() },
            outcome.recorded,
            outcome.period,
            outcome.experiment_id.short()
        ));
        output
    }

    /// Format a visibility summary
    pub fn format_summary(summary: &VisibilitySummary) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Visibility Summary"));
        output.push('\n');
        output.push_str(&format!(
            "{} {} (last {} days)\n",
            "Brand:".cyan().bold(),
            summary.brand,
            summary.days
        ));

        if summary.is_empty() {
            output.push_str(&format!("\n{}\n", "No checks recorded in this window.".dimmed()));
            output.push_str(&Self::footer());
            return output;
        }

        output.push_str(&Self::metrics_block(&summary.metrics));

        let trend = &summary.trend;
        let arrow = match trend.direction {
            TrendDirection::Up => trend.direction.arrow().green(),
            TrendDirection::Down => trend.direction.arrow().red(),
            TrendDirection::Stable => trend.direction.arrow().normal(),
        };
        output.push_str(&format!(
            "\n{} {} {:+.1} ({:.1} → {:.1})\n",
            "Trend:".cyan().bold(),
            arrow,
            trend.change,
            trend.earlier_avg,
            trend.recent_avg
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format generated questions, one per line
    pub fn format_questions(questions: &[Question]) -> String {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{:>2}. {}\n", i + 1, q.text()))
            .collect()
    }

    fn metrics_block(metrics: &PeriodMetrics) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{} {}   {} {}   {} {:.1}%\n",
            "Checks:".cyan().bold(),
            metrics.checks,
            "Score:".cyan().bold(),
            format_score(metrics.mean_score),
            "Visible:".cyan().bold(),
            metrics.visibility_rate * 100.0
        ));

        output.push_str(&Self::section_header("By Provider"));
        for provider in &metrics.by_provider {
            let counts: Vec<String> = provider
                .status_counts
                .iter()
                .map(|(status, count)| format!("{} {}", count, status.label().to_lowercase()))
                .collect();
            output.push_str(&format!(
                "  {:<10} {:>5.1}  {:>3} checks  {}\n",
                provider.provider.to_string(),
                provider.mean_score,
                provider.checks,
                counts.join(", ").dimmed()
            ));
        }
        output
    }

    fn experiment_block(experiment: &Experiment) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {} ({})\n",
            "Experiment:".cyan().bold(),
            experiment.name.bold(),
            experiment.id
        ));
        output.push_str(&format!(
            "{} {}\n",
            "State:".cyan().bold(),
            Self::state(experiment.state.as_str())
        ));
        output.push_str(&format!("{} {}\n", "Brand:".cyan().bold(), experiment.brand.name));
        output.push_str(&format!("{} {}\n", "Hypothesis:".cyan().bold(), experiment.hypothesis));
        if let Some(description) = &experiment.description {
            output.push_str(&format!("{} {}\n", "Description:".cyan().bold(), description));
        }
        if let Some(intervention) = &experiment.intervention {
            output.push_str(&format!("{} {}\n", "Intervention:".cyan().bold(), intervention));
        }
        output.push_str(&format!("{}\n", "Questions:".cyan().bold()));
        for question in &experiment.questions {
            output.push_str(&format!("  * {}\n", question.text()));
        }

        let state = &experiment.state;
        for (label, at) in [
            ("Control start:", state.control_start()),
            ("Control end:", state.control_end()),
            ("Test start:", state.test_start()),
            ("Test end:", state.test_end()),
        ] {
            if let Some(at) = at {
                output.push_str(&format!("{} {}\n", label.cyan().bold(), Self::timestamp(at)));
            }
        }
        output
    }

    fn check_line(check: &VisibilityCheck) -> String {
        let mut line = format!(
            "  {} {:<10} {:<13} {:>3}",
            if check.is_visible() { "v".green() } else { "·".dimmed() },
            check.provider.to_string(),
            Self::status_label(check.status),
            check.score
        );
        if let Some(position) = check.list_position {
            line.push_str(&format!("  #{} of {}", position.position, position.total));
        }
        if !check.cited_sources.is_empty() {
            line.push_str(&format!("  {} {}", "cites".dimmed(), check.cited_sources.join(", ")));
        }
        if !check.competitors_found.is_empty() {
            line.push_str(&format!(
                "  {} {}",
                "also:".dimmed(),
                check.competitors_found.join(", ")
            ));
        }
        line.push('\n');
        line
    }

    fn status_label(status: VisibilityStatus) -> ColoredString {
        match status {
            VisibilityStatus::Featured => status.label().green().bold(),
            VisibilityStatus::Mentioned => status.label().green(),
            VisibilityStatus::Listed => status.label().yellow(),
            VisibilityStatus::CitedSource => status.label().blue(),
            VisibilityStatus::NotFound => status.label().dimmed(),
        }
    }

    fn state(state: &str) -> ColoredString {
        match state {
            "completed" => state.green(),
            "aborted" => state.red(),
            "draft" => state.dimmed(),
            _ => state.yellow(),
        }
    }

    fn confidence(level: ConfidenceLevel) -> ColoredString {
        match level {
            ConfidenceLevel::High => level.label().green(),
            ConfidenceLevel::Medium => level.label().yellow(),
            ConfidenceLevel::Low => level.label().normal(),
        }
    }

    fn signed(value: f64, unit: &str) -> ColoredString {
        let text = format!("{:>+9.1}{}", value, unit);
        if value > 0.0 {
            text.green()
        } else if value < 0.0 {
            text.red()
        } else {
            text.normal()
        }
    }

    fn duration(duration: Duration) -> String {
        let days = duration.num_days();
        let hours = duration.num_hours() - days * 24;
        if days > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}h {}m", hours, duration.num_minutes() - hours * 60)
        }
    }

    fn date(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%d").to_string()
    }

    fn timestamp(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%d %H:%M UTC").to_string()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn batch(&self, batch: &CheckBatch, show_answers: bool) -> String {
        Self::format_batch(batch, show_answers)
    }

    fn report(&self, report: &ComparisonReport) -> String {
        Self::format_report(report)
    }

    fn status(&self, status: &ExperimentStatus) -> String {
        Self::format_status(status)
    }

    fn experiments(&self, experiments: &[Experiment]) -> String {
        Self::format_experiments(experiments)
    }

    fn advance(&self, outcome: &AdvanceOutcome) -> String {
        Self::format_advance(outcome)
    }

    fn run(&self, outcome: &ExperimentRunOutcome) -> String {
        Self::format_run(outcome)
    }

    fn summary(&self, summary: &VisibilitySummary) -> String {
        Self::format_summary(summary)
    }

    fn questions(&self, questions: &[Question]) -> String {
        Self::format_questions(questions)
    }
}
