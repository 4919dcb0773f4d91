// crates/contract-probe-cli/src/main.rs
// ============================================================================
// Module: Contract Probe CLI Entry Point
// Description: Command dispatcher for contract suite runs and config checks.
// Purpose: Run contract suites against a deployment stage from the shell.
// Dependencies: clap, contract-probe-config, contract-probe-runner, tokio.
// ============================================================================

//! ## Overview
//! `contract-probe` runs the built-in `math` and `tasks` suites (and any suite
//! files) against the service base URLs of one stage. Suites run one after the
//! other; the process exits non-zero when any case fails or the configuration
//! is unusable. Configuration problems are reported before any request is
//! sent.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use contract_probe_config::Environment;
use contract_probe_config::env::timeout_from_env;
use contract_probe_runner::AuditSink;
use contract_probe_runner::FileAuditSink;
use contract_probe_runner::NoopAuditSink;
use contract_probe_runner::StderrAuditSink;
use contract_probe_runner::Suite;
use contract_probe_runner::SuiteReport;
use contract_probe_runner::SuiteRunner;
use contract_probe_runner::Verifier;
use contract_probe_runner::load_suite_file;
use contract_probe_runner::report::file_stem;
use contract_probe_services::math_suite;
use contract_probe_services::tasks_suite;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of `--suite-file` arguments accepted per invocation.
const MAX_SUITE_FILES: usize = 64;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "contract-probe", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run contract suites against one stage.
    Run(RunCommand),
    /// List the stages and service base URLs of an environment file.
    Stages(StagesCommand),
    /// Validate an environment file and suite files without sending requests.
    Validate(ValidateCommand),
}

/// Built-in suite selection.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum SuiteChoice {
    /// Math evaluator suite.
    Math,
    /// Tasks service suite.
    Tasks,
    /// Every built-in suite.
    All,
}

/// Output formats for run summaries.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Canonical JSON output.
    Json,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Built-in suite to run (defaults to `all` unless suite files are given).
    #[arg(long, value_enum, value_name = "SUITE")]
    suite: Option<SuiteChoice>,
    /// Additional TOML or JSON suite file (repeatable).
    #[arg(long = "suite-file", value_name = "PATH")]
    suite_files: Vec<PathBuf>,
    /// Stage to target (overrides `STAGE`).
    #[arg(long, value_name = "STAGE")]
    stage: Option<String>,
    /// Environment file (overrides `CONTRACT_PROBE_ENV`).
    #[arg(long = "env-file", value_name = "PATH")]
    env_file: Option<PathBuf>,
    /// Summary output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    /// Directory receiving `<suite>.json` and `<suite>.md` reports.
    #[arg(long = "report-dir", value_name = "DIR")]
    report_dir: Option<PathBuf>,
    /// Append JSON-lines audit events to this file.
    #[arg(long = "audit-log", value_name = "PATH")]
    audit_log: Option<PathBuf>,
    /// Per-request timeout in seconds (overrides `CONTRACT_PROBE_TIMEOUT_SEC`).
    #[arg(long = "timeout-secs", value_name = "SECONDS")]
    timeout_secs: Option<u64>,
    /// Write audit events to stderr when no audit log is set.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Arguments for `stages`.
#[derive(Args, Debug)]
struct StagesCommand {
    /// Environment file (overrides `CONTRACT_PROBE_ENV`).
    #[arg(long = "env-file", value_name = "PATH")]
    env_file: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Environment file (overrides `CONTRACT_PROBE_ENV`).
    #[arg(long = "env-file", value_name = "PATH")]
    env_file: Option<PathBuf>,
    /// Suite file to validate (repeatable).
    #[arg(long = "suite-file", value_name = "PATH")]
    suite_files: Vec<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a printable message.
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

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("contract-probe {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(command).await,
        Commands::Stages(command) => command_stages(&command),
        Commands::Validate(command) => command_validate(&command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_line(help.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let suites = select_suites(command.suite, &command.suite_files)?;
    let environment = load_environment(command.env_file.as_deref())?;
    let stage = environment
        .select_stage(command.stage.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let env_timeout = timeout_from_env().map_err(CliError::new)?;
    let timeout = resolve_timeout(command.timeout_secs, env_timeout, environment.client().timeout())?;
    let audit = build_audit_sink(command.audit_log.as_deref(), command.verbose)?;

    let mut runners = Vec::with_capacity(suites.len());
    for suite in &suites {
        let base_url = stage
            .service_url(&suite.service)
            .map_err(|err| CliError::new(format!("suite `{}`: {err}", suite.name)))?;
        let verifier = Verifier::new(base_url.clone(), timeout)
            .map_err(|err| CliError::new(err.to_string()))?;
        runners.push(SuiteRunner::new(verifier, stage.name()).with_audit(Arc::clone(&audit)));
    }

    let mut reports = Vec::with_capacity(suites.len());
    for (suite, runner) in suites.iter().zip(&runners) {
        let report = runner.run(suite).await.map_err(|err| CliError::new(err.to_string()))?;
        if let Some(dir) = &command.report_dir {
            report.write_to_dir(dir).map_err(|err| CliError::new(err.to_string()))?;
        }
        if command.format == OutputFormat::Text {
            write_stdout_line(report.render_text().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        reports.push(report);
    }

    if command.format == OutputFormat::Json {
        let output = serde_jcs::to_string(&reports)
            .map_err(|err| CliError::new(format!("failed to serialize reports: {err}")))?;
        write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(exit_code_for(&reports))
}

/// Picks the suites to run.
///
/// Without `--suite`, every built-in suite runs unless suite files are given.
/// Suites whose names map onto the same report file stem are rejected.
fn select_suites(choice: Option<SuiteChoice>, files: &[PathBuf]) -> CliResult<Vec<Suite>> {
    if files.len() > MAX_SUITE_FILES {
        return Err(CliError::new(format!(
            "too many suite files ({}; max {MAX_SUITE_FILES})",
            files.len()
        )));
    }
    let choice = choice.or_else(|| files.is_empty().then_some(SuiteChoice::All));
    let mut suites = match choice {
        Some(SuiteChoice::Math) => vec![math_suite()],
        Some(SuiteChoice::Tasks) => vec![tasks_suite()],
        Some(SuiteChoice::All) => vec![math_suite(), tasks_suite()],
        None => Vec::new(),
    };
    for path in files {
        let suite = load_suite_file(path)
            .map_err(|err| CliError::new(format!("{}: {err}", path.display())))?;
        suites.push(suite);
    }
    let mut stems: BTreeMap<String, String> = BTreeMap::new();
    for suite in &suites {
        if let Some(previous) = stems.insert(file_stem(&suite.name), suite.name.clone()) {
            return Err(CliError::new(format!(
                "suites `{previous}` and `{}` would write the same report files",
                suite.name
            )));
        }
    }
    Ok(suites)
}

/// Resolves the request timeout: flag, then environment, then config file.
fn resolve_timeout(
    flag_secs: Option<u64>,
    from_env: Option<Duration>,
    from_config: Option<Duration>,
) -> CliResult<Option<Duration>> {
    match flag_secs {
        Some(0) => Err(CliError::new("--timeout-secs must be greater than zero".to_string())),
        Some(secs) => Ok(Some(Duration::from_secs(secs))),
        None => Ok(from_env.or(from_config)),
    }
}

/// Builds the audit sink: file when `audit_log` is set, stderr when verbose.
fn build_audit_sink(audit_log: Option<&Path>, verbose: bool) -> CliResult<Arc<dyn AuditSink>> {
    if let Some(path) = audit_log {
        let sink = FileAuditSink::new(path).map_err(|err| {
            CliError::new(format!("failed to open audit log {}: {err}", path.display()))
        })?;
        return Ok(Arc::new(sink));
    }
    if verbose {
        return Ok(Arc::new(StderrAuditSink));
    }
    Ok(Arc::new(NoopAuditSink))
}

/// Returns success only when every suite passed.
fn exit_code_for(reports: &[SuiteReport]) -> ExitCode {
    if reports.iter().all(SuiteReport::passed) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// SECTION: Stages Command
// ============================================================================

/// Executes the `stages` command.
fn command_stages(command: &StagesCommand) -> CliResult<ExitCode> {
    let environment = load_environment(command.env_file.as_deref())?;
    for line in stage_lines(&environment) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Formats each stage as a header line followed by indented services.
fn stage_lines(environment: &Environment) -> Vec<String> {
    let mut lines = Vec::new();
    for stage in environment.stages() {
        lines.push(stage.name().to_string());
        for (service, url) in stage.services() {
            lines.push(format!("  {service} = {url}"));
        }
    }
    lines
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let environment = load_environment(command.env_file.as_deref())?;
    let source =
        environment.source().map_or_else(String::new, |path| format!(" ({})", path.display()));
    let stage_count = environment.stages().count();
    write_stdout_line(&format!("environment ok: {stage_count} stage(s){source}"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;

    let suites = select_suites(None, &command.suite_files)?;
    for suite in &suites {
        write_stdout_line(&format!("suite ok: {} ({} cases)", suite.name, suite.cases.len()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads the environment file using the standard resolution rules.
fn load_environment(path: Option<&Path>) -> CliResult<Environment> {
    Environment::load(path).map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
