// src/lib.rs

//! Managed execution of a PowerShell interpreter.
//!
//! A run is configured through [`builder::ExecutorBuilder`], frozen into a
//! [`launch::LaunchSpec`] and executed by [`exec::Executor`], which streams
//! the child's stdout and stderr line by line into an
//! [`context::ExecutionContext`] with every configured secret masked.

pub mod builder;
pub mod cli;
pub mod config;
pub mod context;
pub mod credential;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod params;
pub mod redact;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::builder::ExecutorBuilder;
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::context::{ConsoleContext, ContextSource};
use crate::exec::RunReport;
use crate::fs::RealFileSystem;
use crate::launch::LaunchSpec;
use crate::redact::{MASK, Redactor};

/// Exit status used when the run was cancelled (128 + SIGINT).
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading and inline flags
/// - the console execution context
/// - Ctrl-C → cancellation
/// - the executor
///
/// Returns the exit code the binary should exit with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let context = ContextSource::bound(ConsoleContext::new(!args.no_color));
    let builder = builder_from_args(&args, context)?;
    let executor = builder.build().context("building launch configuration")?;

    if args.dry_run {
        print_dry_run(executor.spec());
        return Ok(0);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling run");
            cancel.cancel();
        });
    }

    let report = executor.start(cancel).await?;
    Ok(exit_code_for(&report))
}

/// Turn CLI arguments (and the job file they name) into a builder.
///
/// Inline flags are applied after the job file, so `--policy`,
/// `--interpreter` and `--working-dir` override it and `--param` /
/// `--secret` add to it.
pub fn builder_from_args(args: &CliArgs, context: ContextSource) -> Result<ExecutorBuilder> {
    let mut builder = match &args.job {
        Some(path) => {
            let job = load_and_validate(Path::new(path))
                .with_context(|| format!("loading job file {path:?}"))?;
            job.into_builder(context, Arc::new(RealFileSystem))?
        }
        None => ExecutorBuilder::new(context),
    };

    if let Some(interpreter) = &args.interpreter {
        builder.interpreter(interpreter.clone());
    }
    if let Some(policy) = args.policy {
        builder.set_execution_policy(policy);
    }
    if let Some(dir) = &args.working_dir {
        builder.set_working_directory(dir)?;
    }
    builder.add_parameters(args.params.clone())?;
    for (name, value) in args.secrets.iter() {
        builder.add_secret(name.clone(), value.clone())?;
    }
    if let Some(file) = &args.file {
        builder.set_file(file)?;
    }
    if let Some(command) = &args.command {
        builder.set_command(command);
    }

    Ok(builder)
}

/// Exit code for the binary: the child's own code, or
/// [`CANCELLED_EXIT_CODE`] / 1 when it has none.
pub fn exit_code_for(report: &RunReport) -> i32 {
    if report.cancelled {
        CANCELLED_EXIT_CODE
    } else {
        report.exit_code.unwrap_or(1)
    }
}

/// Simple dry-run output with every secret masked.
fn print_dry_run(spec: &LaunchSpec) {
    let redactor = Redactor::new(spec.secrets().iter().cloned());

    println!("psexec dry-run");
    println!("  interpreter: {}", spec.interpreter());
    println!("  arguments: {}", redactor.redact(spec.arguments()));
    if let Some(dir) = spec.working_directory() {
        println!("  working_directory: {}", dir.display());
    }
    if let Some(cred) = spec.credential() {
        match cred.domain() {
            Some(domain) => println!("  run_as: {}\\{}", domain, cred.user_name()),
            None => println!("  run_as: {}", cred.user_name()),
        }
    }

    println!("parameters ({}):", spec.parameters().len());
    for param in spec.parameters().iter() {
        if param.is_secret {
            println!("  - {} = {}", param.name, MASK);
        } else {
            println!("  - {} = {}", param.name, redactor.redact(&param.value));
        }
    }

    debug!("dry-run complete (no execution)");
}
