// querygate-cli/src/main.rs
// ============================================================================
// Module: Query Gate CLI Entry Point
// Description: Command dispatcher for the Query Gate server.
// Purpose: Provide the serve and config-validate workflows.
// Dependencies: clap, querygate-config, querygate-mcp, tokio
// ============================================================================

//! ## Overview
//! The `querygate` binary loads configuration, wires the gateway once at
//! startup, and serves on the configured transport. `config validate` checks
//! a configuration file without starting the server.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use querygate_config::QuerygateConfig;
use querygate_mcp::McpServer;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Query Gate — protocol gateway for schema-described database tools.
#[derive(Debug, Parser)]
#[command(name = "querygate", version, about)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the gateway on the configured transport.
    Serve {
        /// Configuration file path (defaults to QUERYGATE_CONFIG or
        /// querygate.toml).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Configuration workflows.
    Config {
        /// Configuration subcommand.
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate a configuration file and exit.
    Validate {
        /// Configuration file path (defaults to QUERYGATE_CONFIG or
        /// querygate.toml).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure with a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// User-facing failure description.
    message: String,
}

impl CliError {
    /// Creates a CLI error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
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
    match cli.command {
        Commands::Serve {
            config,
        } => command_serve(config).await,
        Commands::Config {
            command: ConfigCommands::Validate {
                config,
            },
        } => command_config_validate(config.as_deref()),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let config = QuerygateConfig::load(config_path.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = tokio::task::spawn_blocking(move || McpServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("failed to initialize gateway: {err}")))?;
    server
        .serve()
        .await
        .map_err(|err| CliError::new(format!("gateway server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config validate` command.
fn command_config_validate(config_path: Option<&std::path::Path>) -> CliResult<ExitCode> {
    QuerygateConfig::load(config_path)
        .map_err(|err| CliError::new(format!("invalid configuration: {err}")))?;
    write_stdout_line("configuration is valid")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{message}")
}

/// Writes the failure message to stderr and returns a failing exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "querygate: {message}");
    ExitCode::FAILURE
}
