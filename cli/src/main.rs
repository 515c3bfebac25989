//! CLI entrypoint for tally
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tally_application::{InvokeVotingInput, InvokeVotingUseCase, OperationRegistry, ResultSink};
use tally_domain::{
    AbstainReason, AggregationResult, Category, OperationConfig, Vote, aggregate_votes,
};
use tally_infrastructure::{
    CommandWorker, ConfigLoader, FileConfig, JsonFileResultSink, JsonlRoundLogger,
};
use tally_presentation::{
    AggregateArgs, Cli, Command, ConsoleFormatter, OutputConfig, OutputFormatter, RunArgs,
    progress_for,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Exit status for configuration and runtime failures
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Initialize logging based on verbosity level
///
/// With a log directory, diagnostics are also written to `tally.log`
/// there through a non-blocking writer; the returned guard flushes it.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "tally.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

async fn run(cli: Cli) -> Result<u8> {
    info!("Starting tally");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let output = OutputConfig::from_file(
        config.output.format,
        config.output.color,
        config.output.show_progress,
    )
    .with_flags(cli.format, cli.quiet);
    output.apply_color();

    let log_dir = cli.log_dir.clone().or_else(|| config.output.log_dir.clone());

    match &cli.command {
        Command::Run(args) => run_operation(args, config, output, log_dir).await,
        Command::Aggregate(args) => aggregate(args, output),
        Command::ShowConfig => {
            show_config(&cli, &config);
            Ok(0)
        }
    }
}

async fn run_operation(
    args: &RunArgs,
    config: FileConfig,
    output: OutputConfig,
    log_dir: Option<PathBuf>,
) -> Result<u8> {
    report_issues(&config);

    let context = read_context(args)?;

    if !config.worker.is_configured() {
        bail!("no worker configured; set [worker] command in the config file");
    }
    let worker = Arc::new(CommandWorker::from_config(&config.worker)?);

    // === Dependency Injection ===
    let registry: Arc<dyn OperationRegistry> = Arc::new(config);
    let token = CancellationToken::new();
    let mut use_case =
        InvokeVotingUseCase::new(registry, worker).with_cancellation(token.clone());

    if let Some(dir) = &log_dir
        && let Some(logger) = JsonlRoundLogger::for_round(dir, &args.operation)
    {
        info!("Writing round log to {}", logger.path().display());
        use_case = use_case.with_round_logger(Arc::new(logger));
    }

    // Ctrl-C cancels the round; outstanding workers are recorded as abstains
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling round");
            token.cancel();
        }
    });

    let progress = progress_for(output.progress_mode(std::io::stderr().is_terminal()));

    let result = use_case
        .execute_with_progress(
            InvokeVotingInput::new(args.operation.clone(), context),
            progress.as_ref(),
        )
        .await?;

    emit(&result, output, args.output.as_deref())
}

fn aggregate(args: &AggregateArgs, output: OutputConfig) -> Result<u8> {
    let raw: Vec<String> =
        serde_json::from_str(&args.votes).context("--votes must be a JSON array of strings")?;

    let votes: Vec<Vote> = raw
        .iter()
        .enumerate()
        .map(|(i, answer)| match Category::normalize(answer) {
            Some(category) => Vote::cast(i, category),
            None => Vote::abstain(i, AbstainReason::Malformed).with_detail(answer.clone()),
        })
        .collect();

    let mut builder = OperationConfig::builder(args.strategy, votes.len())
        .tie_break(args.tie_break)
        .k(args.k);
    if let Some(weights) = &args.weights {
        let weights: Vec<f64> =
            serde_json::from_str(weights).context("--weights must be a JSON array of numbers")?;
        builder = builder.weights(weights);
    }
    let config = builder.build()?;

    let result = aggregate_votes(Arc::new(config), votes);
    emit(&result, output, args.output.as_deref())
}

/// Print the result and write it to `path` when one was given
fn emit(result: &AggregationResult, output: OutputConfig, path: Option<&Path>) -> Result<u8> {
    println!("{}", ConsoleFormatter.render(result, output.format));

    if let Some(path) = path {
        JsonFileResultSink::new(path).emit(result)?;
        info!("Result written to {}", path.display());
    }

    Ok(result.exit_code() as u8)
}

fn read_context(args: &RunArgs) -> Result<Value> {
    let text = match (&args.context, &args.context_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read context file {}", path.display()))?,
        (None, None) => return Ok(Value::Object(Default::default())),
    };
    serde_json::from_str(&text).context("task context is not valid JSON")
}

fn report_issues(config: &FileConfig) {
    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("{}", ConsoleFormatter::format_issues(&issues));
    }
}

fn show_config(cli: &Cli, config: &FileConfig) {
    ConfigLoader::print_config_sources(cli.config.as_ref());

    println!();
    println!("Operations:");
    let names = config.operation_names();
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        match config.operation(&name) {
            Ok(op) => println!("  {}", ConsoleFormatter::format_operation(&op)),
            Err(e) => println!("  {}: {}", name, e),
        }
    }

    if config.worker.is_configured() {
        println!();
        println!("Worker: {}", config.worker.command.join(" "));
    }

    let issues = config.validate();
    if !issues.is_empty() {
        println!();
        println!("{}", ConsoleFormatter::format_issues(&issues));
    }
}
