//! Progress reporting for check batches

use aeo_application::CheckProgressNotifier;
use aeo_domain::ProviderId;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a check with one bar per question
pub struct ProgressReporter {
    multi: MultiProgress,
    batch_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            batch_bar: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn short(question: &str) -> String {
        const MAX: usize = 40;
        if question.chars().count() <= MAX {
            return question.to_string();
        }
        let cut: String = question.chars().take(MAX - 3).collect();
        format!("{}...", cut)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckProgressNotifier for ProgressReporter {
    fn on_batch_start(&self, question: &str, total_providers: usize) {
        let pb = self.multi.add(ProgressBar::new(total_providers as u64));
        pb.set_style(Self::batch_style());
        pb.set_prefix(Self::short(question));
        pb.set_message("Asking...");

        if let Ok(mut bar) = self.batch_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_provider_complete(&self, provider: &ProviderId, success: bool) {
        if let Ok(bar) = self.batch_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), provider)
            } else {
                format!("{} {}", "x".red(), provider)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_batch_complete(&self, _question: &str) {
        if let Ok(mut bar) = self.batch_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl CheckProgressNotifier for SimpleProgress {
    fn on_batch_start(&self, question: &str, total_providers: usize) {
        eprintln!(
            "{} {} ({} providers)",
            "->".cyan(),
            question.bold(),
            total_providers
        );
    }

    fn on_provider_complete(&self, provider: &ProviderId, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), provider);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), provider);
        }
    }

    fn on_batch_complete(&self, _question: &str) {
        eprintln!();
    }
}
