//! CLI entrypoint for deliberation
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use deliberation_application::{
    CrowdScoringInput, CrowdScoringUseCase, DotVoteInput, DotVoteUseCase, EscalationInput,
    NoProgress, PhasePipeline, ProgressNotifier, RemoteCallExecutor, RunEscalationUseCase,
};
use deliberation_domain::Topic;
use deliberation_infrastructure::{
    AnthropicEngine, CatalogLoader, ConfigLoader, FileConfig, FileOutputFormat, JsonlTraceLogger,
    config::ENV_PREFIX,
};
use deliberation_presentation::{Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines reach the file
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting deliberation");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    config.validate().context("Invalid configuration")?;

    if cli.show_config {
        return show_config(&cli, &config);
    }

    if !config.output.color {
        ConsoleFormatter::set_color(false);
    }
    let format = cli.output.unwrap_or(match config.output.format {
        FileOutputFormat::Summary => OutputFormat::Summary,
        FileOutputFormat::Json => OutputFormat::Json,
    });

    let Some(command) = cli.command.clone() else {
        bail!("A command is required. Run `deliberation --help` for usage.");
    };

    // The catalog is local; no engine needed
    if let Command::Catalog { dir } = &command {
        let dir = dir
            .clone()
            .or_else(|| config.catalog.dir.clone())
            .context("No catalog directory. Pass --dir or set [catalog] dir.")?;
        let cards = CatalogLoader::load_dir(&dir)?;
        let output = match format {
            OutputFormat::Summary => ConsoleFormatter::catalog(&cards),
            OutputFormat::Json => ConsoleFormatter::catalog_json(&cards),
        };
        println!("{}", output);
        return Ok(());
    }

    let participants = config.participants();
    let budgets = config.budgets.to_call_budgets();

    let reporter;
    let progress: &dyn ProgressNotifier = if cli.quiet || !config.output.show_progress {
        &NoProgress
    } else {
        reporter = ProgressReporter::new();
        &reporter
    };

    let (pipeline, trace) = build_pipeline(&cli, &config)?;

    let output = match command {
        Command::Escalate { question } => {
            let use_case = RunEscalationUseCase::new(pipeline)
                .with_budgets(budgets)
                .with_thresholds(config.escalation.thresholds()?);
            let input = EscalationInput::new(Topic::new(question)?, participants);
            let outcome = use_case.execute_with_progress(input, progress).await?;
            match format {
                OutputFormat::Summary => ConsoleFormatter::escalation(&outcome),
                OutputFormat::Json => ConsoleFormatter::escalation_json(&outcome),
            }
        }
        Command::Crowd {
            challenge,
            rounds,
            seed,
        } => {
            let mut params = config.scoring.to_params();
            if let Some(rounds) = rounds {
                params = params.with_rounds(rounds);
            }
            if seed.is_some() {
                params.seed = seed;
            }
            let use_case = CrowdScoringUseCase::new(pipeline)
                .with_budgets(budgets)
                .with_params(params);
            let input = CrowdScoringInput::new(Topic::new(challenge)?, participants);
            let outcome = use_case.execute_with_progress(input, progress).await?;
            match format {
                OutputFormat::Summary => ConsoleFormatter::crowd(&outcome),
                OutputFormat::Json => ConsoleFormatter::crowd_json(&outcome),
            }
        }
        Command::Vote { question, runoff } => {
            let mut params = config.dot_vote.to_params();
            if runoff {
                params = params.with_runoff(true);
            }
            let use_case = DotVoteUseCase::new(pipeline)
                .with_budgets(budgets)
                .with_params(params);
            let input = DotVoteInput::new(Topic::new(question)?, participants);
            let outcome = use_case.execute_with_progress(input, progress).await?;
            match format {
                OutputFormat::Summary => ConsoleFormatter::vote(&outcome),
                OutputFormat::Json => ConsoleFormatter::vote_json(&outcome),
            }
        }
        Command::Catalog { .. } => return Ok(()),
    };

    println!("{}", output);

    if let Some(trace) = &trace {
        info!(
            "Trace complete: {} events in {}",
            trace.written(),
            trace.path().display()
        );
    }

    Ok(())
}

/// Console logging filtered by `-v` (or `RUST_LOG`), plus an optional
/// plain-text file layer written off the hot path.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Engine, executor and optional trace logger wired into a pipeline
fn build_pipeline(
    cli: &Cli,
    config: &FileConfig,
) -> Result<(PhasePipeline, Option<Arc<JsonlTraceLogger>>)> {
    let engine = Arc::new(AnthropicEngine::from_config(&config.engine)?);
    let executor = RemoteCallExecutor::new(engine, config.engine.model_roster());
    let mut pipeline = PhasePipeline::new(executor);

    let trace = open_trace(cli, config)?;
    if let Some(trace) = &trace {
        info!("Writing call trace to {}", trace.path().display());
        pipeline = pipeline.with_trace_logger(trace.clone());
    }
    Ok((pipeline, trace))
}

/// Trace logger from `--trace`, or from `[trace]` when enabled there
fn open_trace(cli: &Cli, config: &FileConfig) -> Result<Option<Arc<JsonlTraceLogger>>> {
    let logger = if let Some(path) = &cli.trace {
        JsonlTraceLogger::open(path)
            .with_context(|| format!("Failed to open trace file {}", path.display()))?
    } else if config.trace.enabled {
        let dir = config
            .trace
            .resolved_dir()
            .context("No trace directory. Set [trace] dir.")?;
        JsonlTraceLogger::in_dir(&dir)
            .with_context(|| format!("Failed to create trace in {}", dir.display()))?
    } else {
        return Ok(None);
    };
    Ok(Some(Arc::new(logger)))
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    println!("Configuration sources:");
    if cli.no_config {
        println!("  (files disabled by --no-config)");
    } else {
        for source in ConfigLoader::sources(cli.config.as_deref()) {
            println!(
                "  {:<8} {} {}",
                source.label,
                source.path.display(),
                if source.found { "(found)" } else { "(not found)" }
            );
        }
    }
    println!(
        "  env      {}* (use __ between section and key)",
        ENV_PREFIX
    );

    println!();
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
