// src/errors.rs

//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsExecError {
    #[error("Configuration already has a parameter with the following name: {0}")]
    DuplicateParameter(String),

    #[error("Could not find {kind}: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("No execution context is available for the current run")]
    ContextUnavailable,

    #[error("Nothing to execute: call set_file or set_command before build")]
    MissingExecutionData,

    #[error("Error when attempting to execute {target}: {source}")]
    ProcessLaunch {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("start_blocking was called from inside a Tokio runtime; await start instead")]
    NestedRuntime,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PsExecError>;
