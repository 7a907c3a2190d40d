//! CLI entrypoint for Agent Crew
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use crew_application::{
    NoProgress, PipelineLogger, ProgressNotifier, RequirementOutcome, TeamOrchestrator,
};
use crew_domain::TaskId;
use crew_infrastructure::{
    CompletionsClient, ConfigLoader, FileConfig, FileOutputFormat, InMemoryStateStore,
    JsonlPipelineLogger,
};
use crew_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&cli);

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    colored::control::set_override(config.output.color);

    let requirement = match cli.requirement.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => bail!("A requirement is required. See --help for usage."),
    };

    info!("Starting Agent Crew");

    // === Dependency Injection ===
    let mut orchestration = config.orchestration.to_orchestration_config();
    if let Some(max_rounds) = cli.max_rounds {
        orchestration = orchestration.with_max_rounds(max_rounds);
    }
    let agent_count = cli.agents.unwrap_or(orchestration.default_agent_count);

    let generator = Arc::new(CompletionsClient::new(&config.generation)?);
    let store = Arc::new(InMemoryStateStore::new());
    let mut orchestrator = TeamOrchestrator::new(generator, store, orchestration);
    if let Some(logger) = transcript_logger(&config) {
        orchestrator = orchestrator.with_logger(logger);
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    if !cli.quiet {
        println!();
        println!("Requirement: {}", requirement);
        println!("Agents: {}", agent_count);
        println!();
    }

    let outcome = tokio::select! {
        result = orchestrator.handle_requirement(&requirement, agent_count, progress.as_ref()) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted before the plan was ready");
            bail!("Interrupted");
        }
    };

    let format = output_format(&cli, &config);
    println!("{}", render(&outcome, format));

    if !outcome.success {
        bail!("{}", outcome.message);
    }

    if cli.execute {
        let Some(plan) = &outcome.plan else {
            return Ok(());
        };
        let ids: Vec<TaskId> = plan.tasks().iter().map(|t| t.id.clone()).collect();
        let execution = tokio::select! {
            result = orchestrator.execute_tasks(&ids, progress.as_ref()) => result?,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted during task execution");
                bail!("Interrupted");
            }
        };
        println!("{}", ConsoleFormatter::format_execution(&execution));
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    // Initialize logging based on verbosity level
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "agent-crew.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn transcript_logger(config: &FileConfig) -> Option<Arc<dyn PipelineLogger>> {
    let path = config.logging.transcript_file.as_deref()?;
    match JsonlPipelineLogger::open(path) {
        Some(logger) => Some(Arc::new(logger)),
        None => {
            warn!("Transcript disabled: could not open {}", path);
            None
        }
    }
}

/// The command line wins over the config file
fn output_format(cli: &Cli, config: &FileConfig) -> OutputFormat {
    cli.output.unwrap_or(match config.output.format.unwrap_or_default() {
        FileOutputFormat::Full => OutputFormat::Full,
        FileOutputFormat::Plan => OutputFormat::Plan,
        FileOutputFormat::Json => OutputFormat::Json,
    })
}

fn render(outcome: &RequirementOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Full => ConsoleFormatter::format(outcome),
        OutputFormat::Plan => ConsoleFormatter::format_plan_only(outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(outcome),
    }
}
