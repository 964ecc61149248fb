// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::ExecutionPolicy;

/// Command-line arguments for `psexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "psexec",
    version,
    about = "Run a PowerShell script or command with streamed, secret-masked output.",
    long_about = None
)]
pub struct CliArgs {
    /// Job file (TOML) describing the run.
    ///
    /// Inline flags below are applied on top of it.
    #[arg(long, value_name = "PATH")]
    pub job: Option<String>,

    /// Script file to execute.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["command", "job"])]
    pub file: Option<String>,

    /// Inline command; wrapped as `& { ... }` if it is not already.
    #[arg(long, value_name = "TEXT", conflicts_with = "job")]
    pub command: Option<String>,

    /// Execution policy passed to the interpreter.
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<ExecutionPolicy>,

    /// Working directory for the interpreter; must exist.
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<String>,

    /// Environment parameter for the script (repeatable).
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Environment parameter whose value is masked in output (repeatable).
    #[arg(long = "secret", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub secrets: Vec<(String, String)>,

    /// Interpreter binary (default: `PowerShell.exe` on Windows, `pwsh` elsewhere).
    #[arg(long, value_name = "PROGRAM")]
    pub interpreter: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PSEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Do not color error lines.
    #[arg(long)]
    pub no_color: bool,

    /// Validate and print the launch, but don't start the interpreter.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("parameter name is empty in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
