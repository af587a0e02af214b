//! CLI command definitions

use aeo_domain::{ExperimentId, OutputFormat};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Human-readable report
    Text,
    /// JSON output
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for aeo-tracker
#[derive(Parser, Debug)]
#[command(name = "aeo-tracker")]
#[command(author, version, about = "Track how AI answer engines mention your brand")]
#[command(long_about = r#"
AEO Tracker asks several LLM providers the same question and classifies how
your brand shows up in each answer: featured, mentioned, listed, cited as a
source, or not found.

Experiments compare a control period with a test period after a content
change and report whether visibility moved significantly.

Configuration files are loaded from (in priority order):
1. AEO_* environment variables
2. --config <path>     Explicit config file
3. ./aeo-tracker.toml  Project-level config
4. ~/.config/aeo-tracker/config.toml   Global config

Example:
  aeo-tracker check --brand Acme "What is the best CRM for startups?"
  aeo-tracker experiment create --brand Acme --name "Docs launch" \
      --hypothesis "New docs raise visibility" -q "Best CRM?"
  aeo-tracker summary --brand Acme --days 30
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to [output] format, then text)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask every provider one question and classify brand visibility
    Check {
        /// Brand name (looked up in [[brands]], or tracked ad hoc)
        #[arg(short, long)]
        brand: String,

        /// Brand web domain, for ad hoc brands
        #[arg(long)]
        domain: Option<String>,

        /// Competitor to watch for (can be specified multiple times)
        #[arg(long = "competitor", value_name = "NAME")]
        competitors: Vec<String>,

        /// Only ask these providers (can be specified multiple times)
        #[arg(short, long = "provider", value_name = "ID")]
        providers: Vec<String>,

        /// Per-provider timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Do not append results to history
        #[arg(long)]
        no_record: bool,

        /// Print each provider's full answer
        #[arg(long)]
        show_answers: bool,

        /// The question to ask
        question: String,
    },

    /// Manage before/after experiments
    Experiment {
        #[command(subcommand)]
        command: ExperimentCommand,
    },

    /// Summarize a brand's recent visibility
    Summary {
        #[arg(short, long)]
        brand: String,

        /// Look back this many days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Turn a keyword into questions worth tracking
    Questions {
        keyword: String,

        /// Number of questions to generate
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// Skip persona variants ("... for startups?")
        #[arg(long)]
        no_personas: bool,

        /// Skip use-case variants ("... for scaling?")
        #[arg(long)]
        no_use_cases: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExperimentCommand {
    /// Create a draft experiment
    Create {
        #[arg(short, long)]
        brand: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        hypothesis: String,

        /// Target question (can be specified multiple times)
        #[arg(short = 'q', long = "question", value_name = "TEXT", required = true)]
        questions: Vec<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Start the control period
    StartControl { id: ExperimentId },

    /// Stop the control period
    StopControl { id: ExperimentId },

    /// Start the test period after publishing the content change
    StartTest {
        id: ExperimentId,

        /// What changed between the periods
        #[arg(long)]
        intervention: Option<String>,
    },

    /// Stop the test period and print the report
    StopTest { id: ExperimentId },

    /// Abort the experiment
    Abort { id: ExperimentId },

    /// Run checks for every question in the current period
    Run {
        id: ExperimentId,

        /// Only ask these providers (can be specified multiple times)
        #[arg(short, long = "provider", value_name = "ID")]
        providers: Vec<String>,

        /// Per-provider timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Compare control and test periods
    Report { id: ExperimentId },

    /// Show an experiment and its current period
    Show { id: ExperimentId },

    /// List experiments, newest first
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_command() {
        let cli = Cli::try_parse_from([
            "aeo-tracker",
            "-vv",
            "check",
            "--brand",
            "Acme",
            "-p",
            "openai",
            "-p",
            "gemini",
            "--timeout",
            "20",
            "Best CRM?",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Check {
                brand,
                providers,
                timeout,
                no_record,
                question,
                ..
            }) => {
                assert_eq!(brand, "Acme");
                assert_eq!(providers, vec!["openai", "gemini"]);
                assert_eq!(timeout, Some(20));
                assert!(!no_record);
                assert_eq!(question, "Best CRM?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_experiment_id_is_parsed() {
        let id = ExperimentId::new();
        let cli = Cli::try_parse_from([
            "aeo-tracker",
            "experiment",
            "start-test",
            &id.to_string(),
            "--intervention",
            "Published comparison page",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Experiment {
                command: ExperimentCommand::StartTest { id: parsed, intervention },
            }) => {
                assert_eq!(parsed, id);
                assert_eq!(intervention.as_deref(), Some("Published comparison page"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_experiment_id_is_rejected() {
        let result = Cli::try_parse_from(["aeo-tracker", "experiment", "show", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_requires_a_question() {
        let result = Cli::try_parse_from([
            "aeo-tracker",
            "experiment",
            "create",
            "--brand",
            "Acme",
            "--name",
            "x",
            "--hypothesis",
            "y",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_output_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["aeo-tracker", "questions", "crm", "-o", "json"]).unwrap();
        assert_eq!(cli.output.map(OutputFormat::from), Some(OutputFormat::Json));
    }
}
