// crates/liars-dice-cli/src/main.rs
// ============================================================================
// Module: Liar's Dice Test Runner Entry Point
// Description: Command-line runner for the Liar's Dice integration suite.
// Purpose: Resolve configuration, run the scenarios, and write the report.
// Dependencies: clap, liars-dice-harness, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! `liars-dice-test` points the scenario suite at a running Liar's Dice
//! server. Settings resolve as flags over environment overrides over
//! defaults; the server URL has no default. Reports land in the output
//! directory and the exit code is non-zero when any case fails.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod telemetry;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use std::time::Instant;

use clap::ArgAction;
use clap::Parser;
use liars_dice_harness::GameClient;
use liars_dice_harness::HarnessConfig;
use liars_dice_harness::SuiteRunner;
use liars_dice_harness::TestReporter;
use liars_dice_harness::config::EnvOverrides;
use liars_dice_harness::suite::catalogue;
use liars_dice_harness::suite::select;
use thiserror::Error;
use tracing::info;

/// Run name recorded in reports.
const RUN_NAME: &str = "liars-dice";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Liar's Dice integration test runner.
#[derive(Debug, Parser)]
#[command(name = "liars-dice-test", version, about)]
struct Cli {
    /// Server to test, with or without scheme.
    #[arg(long, value_name = "URL")]
    server_url: Option<String>,
    /// Port used when the URL does not name one.
    #[arg(long, value_name = "PORT")]
    server_port: Option<u16>,
    /// Accept invalid TLS certificates.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_ssl_verification: bool,
    /// Directory for report artifacts.
    #[arg(long = "xml-output", short = 'o', value_name = "DIR")]
    output_directory: Option<PathBuf>,
    /// Run only cases whose name contains this text.
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,
    /// Concurrent workers for the load case.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
    /// Games each load worker creates.
    #[arg(long, value_name = "N")]
    games_per_worker: Option<usize>,
    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout_sec: Option<u64>,
    /// Run cases known to crash the reference server.
    #[arg(long, action = ArgAction::SetTrue)]
    run_known_crashes: bool,
    /// Emit logs as JSON lines.
    #[arg(long, action = ArgAction::SetTrue)]
    log_json: bool,
    /// Print the selected case names and exit.
    #[arg(long, action = ArgAction::SetTrue)]
    list: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and runs the suite.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json)
        .map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))?;

    let scenarios = select(catalogue(), cli.filter.as_deref());
    if cli.list {
        for scenario in &scenarios {
            write_stdout_line(&format!("{}  {}", scenario.name, scenario.description))?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let env = EnvOverrides::load().map_err(|err| CliError::new(err.to_string()))?;
    let config = resolve_config(&cli, &env)?;
    let client = GameClient::from_config(&config).map_err(|err| CliError::new(err.to_string()))?;
    let mut reporter = TestReporter::new(&config.output_directory, RUN_NAME)
        .map_err(|err| CliError::new(err.to_string()))?;

    let started = Instant::now();
    info!(server = %client.base_url(), cases = scenarios.len(), "starting suite");
    let runner = SuiteRunner::new(client, config);
    let report = runner.run(&scenarios).await;
    let written = reporter
        .finish(&report, &runner.client().transcript())
        .map_err(|err| CliError::new(err.to_string()))?;
    for path in &written {
        info!(path = %path.display(), "wrote report artifact");
    }
    info!(total_time_ms = started.elapsed().as_millis(), "run complete");

    write_stdout_line(&format!(
        "{} passed, {} failed, {} skipped in {} ms",
        report.passed(),
        report.failed(),
        report.skipped(),
        report.duration_ms
    ))?;
    Ok(if report.success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Merges flags over environment overrides over defaults.
fn resolve_config(cli: &Cli, env: &EnvOverrides) -> CliResult<HarnessConfig> {
    let mut config = env.apply(HarnessConfig::new(String::new()));
    if let Some(url) = &cli.server_url {
        config.server_url.clone_from(url);
    }
    if config.server_url.trim().is_empty() {
        return Err(CliError::new(
            "--server-url is required (or set LIARS_DICE_TEST_SERVER_URL)".to_string(),
        ));
    }
    if let Some(port) = cli.server_port {
        config.server_port = port;
    }
    if cli.skip_ssl_verification {
        config.skip_ssl_verification = true;
    }
    if let Some(dir) = &cli.output_directory {
        config.output_directory.clone_from(dir);
    }
    if let Some(seconds) = cli.timeout_sec {
        if seconds == 0 {
            return Err(CliError::new("--timeout-sec must be greater than zero".to_string()));
        }
        config.set_request_timeout(Duration::from_secs(seconds));
    }
    if let Some(workers) = cli.workers {
        config.load.workers = positive("--workers", workers)?;
    }
    if let Some(games) = cli.games_per_worker {
        config.load.games_per_worker = positive("--games-per-worker", games)?;
    }
    config.run_known_crashes = cli.run_known_crashes;
    config.connection_string().map_err(|err| CliError::new(err.to_string()))?;
    Ok(config)
}

/// Rejects zero for count flags.
fn positive(flag: &str, value: usize) -> CliResult<usize> {
    if value == 0 {
        Err(CliError::new(format!("{flag} must be greater than zero")))
    } else {
        Ok(value)
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
