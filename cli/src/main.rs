//! CLI entrypoint for aeo-tracker
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use aeo_application::{
    record_batch, CheckProgressNotifier, CreateExperimentInput, ExperimentManager, NoProgress,
    RunCheckInput, RunCheckUseCase, SystemClock, VisibilitySummaryUseCase,
};
use aeo_domain::{
    question_variations, Brand, ExperimentAction, OutputFormat, ProviderId, Question, Severity,
    VariationOptions,
};
use aeo_infrastructure::{
    build_providers, ConfigLoader, FileConfig, JsonFileExperimentRepository, JsonlHistoryStore,
    KNOWN_PROVIDERS,
};
use aeo_presentation::{
    formatter_for, Cli, Command, ExperimentCommand, OutputFormatter, ProgressReporter,
    SimpleProgress,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    // Held until exit so the file writer flushes
    let _log_guard = init_logging(
        cli.verbose,
        config.logging.directory.as_deref(),
        config.logging.level.as_deref(),
    );

    info!("Starting aeo-tracker");

    let mut has_errors = false;
    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => {
                eprintln!("config error: {}", issue.message);
                has_errors = true;
            }
        }
    }
    if has_errors {
        bail!("Invalid configuration");
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let formatter = formatter_for(format);
    let show_progress = !cli.quiet && format == OutputFormat::Text && config.check.show_progress;

    let Some(command) = cli.command else {
        bail!("No command given. Run `aeo-tracker --help` for usage.");
    };

    // Ctrl-C stops outstanding provider calls; finished results are kept
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding requests");
            signal_token.cancel();
        }
    });

    // === Dependency Injection ===
    let clock = Arc::new(SystemClock);
    let history = Arc::new(
        JsonlHistoryStore::open(config.storage.history_path())
            .context("Failed to open history store")?,
    );

    let output = match command {
        Command::Check {
            brand,
            domain,
            competitors,
            providers,
            timeout,
            no_record,
            show_answers,
            question,
        } => {
            let mut brand = config
                .brand(&brand)
                .unwrap_or_else(|| Brand::new(brand.trim()));
            if let Some(domain) = domain {
                brand = brand.with_domain(domain);
            }
            for competitor in competitors {
                brand = brand.with_competitor(competitor);
            }

            let runner = check_runner(&config, &providers, timeout, clock.clone(), cancel)?;
            let progress = progress_for(show_progress);
            let batch = runner
                .execute_with_progress(RunCheckInput::new(question, brand), progress.as_ref())
                .await?;

            if !no_record {
                let recorded =
                    record_batch(history.as_ref(), &batch, config.storage_timeout()).await?;
                info!("Recorded {} checks", recorded);
            }

            formatter.batch(&batch, show_answers)
        }

        Command::Experiment { command } => {
            let repository = Arc::new(
                JsonFileExperimentRepository::open(config.storage.experiments_path())
                    .context("Failed to open experiment store")?,
            );
            let manager = ExperimentManager::new(repository, history, clock.clone())
                .with_policy(config.experiment_policy());

            run_experiment_command(
                command,
                &manager,
                &config,
                formatter.as_ref(),
                show_progress,
                clock,
                cancel,
            )
            .await?
        }

        Command::Summary { brand, days } => {
            let use_case = VisibilitySummaryUseCase::new(history, clock, config.storage_timeout());
            let summary = use_case.execute(&brand, days).await?;
            if summary.is_empty() {
                warn!("No checks recorded for {} in the last {} days", brand, days);
            }
            formatter.summary(&summary)
        }

        Command::Questions {
            keyword,
            count,
            no_personas,
            no_use_cases,
        } => {
            let options = VariationOptions {
                personas: !no_personas,
                use_cases: !no_use_cases,
            };
            formatter.questions(&question_variations(&keyword, count, options))
        }
    };

    println!("{}", output);

    Ok(())
}

async fn run_experiment_command(
    command: ExperimentCommand,
    manager: &ExperimentManager,
    config: &FileConfig,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
    clock: Arc<SystemClock>,
    cancel: CancellationToken,
) -> Result<String> {
    let output = match command {
        ExperimentCommand::Create {
            brand,
            name,
            hypothesis,
            questions,
            description,
        } => {
            let brand = config
                .brand(&brand)
                .unwrap_or_else(|| Brand::new(brand.trim()));
            let questions = questions
                .into_iter()
                .map(Question::try_new)
                .collect::<Result<Vec<_>, _>>()?;

            let mut input = CreateExperimentInput::new(name, brand, hypothesis, questions);
            if let Some(description) = description {
                input = input.with_description(description);
            }

            let experiment = manager.create(input).await?;
            formatter.experiments(std::slice::from_ref(&experiment))
        }

        ExperimentCommand::StartControl { id } => {
            formatter.advance(&manager.advance(&id, ExperimentAction::StartControl).await?)
        }
        ExperimentCommand::StopControl { id } => {
            formatter.advance(&manager.advance(&id, ExperimentAction::StopControl).await?)
        }
        ExperimentCommand::StartTest { id, intervention } => formatter.advance(
            &manager
                .advance(&id, ExperimentAction::StartTest { intervention })
                .await?,
        ),
        ExperimentCommand::StopTest { id } => {
            formatter.advance(&manager.advance(&id, ExperimentAction::StopTest).await?)
        }
        ExperimentCommand::Abort { id } => {
            formatter.advance(&manager.advance(&id, ExperimentAction::Abort).await?)
        }

        ExperimentCommand::Run {
            id,
            providers,
            timeout,
        } => {
            let runner = check_runner(config, &providers, timeout, clock, cancel)?;
            let progress = progress_for(show_progress);
            let outcome = manager.run_checks(&id, &runner, progress.as_ref()).await?;
            if outcome.cancelled {
                warn!("Run interrupted after {} questions", outcome.batches.len());
            }
            formatter.run(&outcome)
        }

        ExperimentCommand::Report { id } => formatter.report(&manager.build_report(&id).await?),
        ExperimentCommand::Show { id } => formatter.status(&manager.status(&id).await?),
        ExperimentCommand::List => formatter.experiments(&manager.list().await?),
    };

    Ok(output)
}

/// Build the orchestrator for the selected providers
fn check_runner(
    config: &FileConfig,
    providers: &[String],
    timeout: Option<u64>,
    clock: Arc<SystemClock>,
    cancel: CancellationToken,
) -> Result<RunCheckUseCase> {
    let only: Vec<ProviderId> = providers.iter().map(|p| ProviderId::new(p.trim())).collect();
    let adapters = build_providers(&config.providers, &only)?;
    if adapters.is_empty() {
        bail!(
            "No provider is ready. Set OPENAI_API_KEY, ANTHROPIC_API_KEY or GOOGLE_API_KEY, \
             or configure [providers] (known: {})",
            KNOWN_PROVIDERS.join(", ")
        );
    }

    let mut params = config.check_params();
    if let Some(secs) = timeout {
        if secs == 0 {
            bail!("--timeout must be greater than zero");
        }
        params = params.with_provider_timeout(Duration::from_secs(secs));
    }

    Ok(RunCheckUseCase::new(adapters, clock)
        .with_params(params)
        .with_cancellation(cancel))
}

fn progress_for(show_progress: bool) -> Box<dyn CheckProgressNotifier> {
    if !show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    }
}

/// Initialize logging: stderr by verbosity, plus an optional daily log file
fn init_logging(verbose: u8, directory: Option<&Path>, level: Option<&str>) -> Option<WorkerGuard> {
    let console_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(console_level));

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "aeo-tracker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(level.unwrap_or(console_level)));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
