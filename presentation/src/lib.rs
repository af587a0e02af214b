//! Presentation layer for aeo-tracker
//!
//! This crate contains CLI definitions, output formatters
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ExperimentCommand};
pub use output::console::ConsoleFormatter;
pub use output::formatter::{formatter_for, JsonFormatter, OutputFormatter};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
