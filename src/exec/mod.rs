// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the interpreter described by a [`LaunchSpec`] with
//! `tokio::process::Command` and streams its output into an execution
//! context.
//!
//! - [`launcher`] owns [`Executor`], which spawns the child, waits for it and
//!   kills it when the run's cancellation token fires.
//! - [`stream`] pumps stdout/stderr line by line through the capture callback
//!   and the [`SecureLineWriter`](crate::redact::SecureLineWriter).
//! - [`credential`] applies alternate-user launch settings.
//!
//! [`LaunchSpec`]: crate::launch::LaunchSpec

pub mod credential;
pub mod launcher;
pub mod stream;

pub use launcher::{Executor, RunReport};
pub use tokio_util::sync::CancellationToken;
