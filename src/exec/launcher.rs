// src/exec/launcher.rs

//! Spawning, waiting for and killing the interpreter process.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::ContextSource;
use crate::errors::{PsExecError, Result};
use crate::exec::{credential, stream};
use crate::launch::LaunchSpec;
use crate::redact::{Redactor, SecureLineWriter};
use crate::types::OutputStream;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How a run ended.
///
/// A non-zero exit code is reported here, not as an error: stderr output and
/// failing scripts are the script's business. `exit_code` is `None` when the
/// child was killed or ended by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub exit_code: Option<i32>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn success(&self) -> bool {
        !self.cancelled && self.exit_code == Some(0)
    }
}

/// Runs one frozen [`LaunchSpec`] per [`start`](Self::start) call.
///
/// The execution context is resolved from the [`ContextSource`] at the start
/// of every run. An `Executor` holds no process state between runs, but a
/// single run must not be shared by concurrent callers.
#[derive(Debug, Clone)]
pub struct Executor {
    spec: Arc<LaunchSpec>,
    context: ContextSource,
}

impl Executor {
    pub fn new(spec: LaunchSpec, context: ContextSource) -> Self {
        Self {
            spec: Arc::new(spec),
            context,
        }
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    /// Launch the interpreter and wait until it exits or `cancel` fires.
    ///
    /// Cancelling kills the child immediately; lines that were not yet
    /// forwarded at that point are dropped.
    pub async fn start(&self, cancel: CancellationToken) -> Result<RunReport> {
        let context = self
            .context
            .resolve()
            .ok_or(PsExecError::ContextUnavailable)?;

        let redactor = Arc::new(Redactor::new(self.spec.secrets().iter().cloned()));
        let target = redactor.redact(self.spec.execution_data()).into_owned();

        if cancel.is_cancelled() {
            info!(target = %target, "run cancelled before launch");
            return Ok(RunReport {
                exit_code: None,
                cancelled: true,
            });
        }

        let mut cmd = Command::new(self.spec.interpreter());
        cmd.args(self.spec.argv());
        if let Some(dir) = self.spec.working_directory() {
            cmd.current_dir(dir);
        }
        cmd.envs(self.spec.parameters().env_pairs());
        if let Some(cred) = self.spec.credential() {
            credential::apply(&mut cmd, cred)?;
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        info!(
            interpreter = %self.spec.interpreter(),
            mode = ?self.spec.mode(),
            policy = %self.spec.policy(),
            target = %target,
            "starting interpreter process"
        );

        let mut child = cmd.spawn().map_err(|source| PsExecError::ProcessLaunch {
            target: target.clone(),
            source,
        })?;

        let writer = Arc::new(SecureLineWriter::new(context, redactor));
        let capture = self.spec.output_capture().cloned();
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(stream::spawn_line_pump(
                stdout,
                OutputStream::Stdout,
                Arc::clone(&writer),
                capture.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(stream::spawn_line_pump(
                stderr,
                OutputStream::Stderr,
                Arc::clone(&writer),
                capture,
            ));
        }

        tokio::select! {
            biased;

            status_res = child.wait() => {
                let status = status_res.map_err(|source| PsExecError::ProcessLaunch {
                    target: target.clone(),
                    source,
                })?;
                let drained = drain(pumps, &cancel).await;

                info!(
                    target = %target,
                    exit_code = ?status.code(),
                    success = status.success(),
                    "interpreter process exited"
                );
                Ok(RunReport {
                    exit_code: status.code(),
                    cancelled: !drained,
                })
            }

            _ = cancel.cancelled() => {
                info!(target = %target, "cancellation requested; killing interpreter process");
                if let Err(e) = child.kill().await {
                    warn!(target = %target, error = %e, "failed to kill interpreter process");
                }
                for pump in pumps.iter() {
                    pump.abort();
                }
                Ok(RunReport {
                    exit_code: None,
                    cancelled: true,
                })
            }
        }
    }

    /// [`start`](Self::start) on a private current-thread runtime.
    ///
    /// For hosts that run each job on its own OS thread. Called from inside a
    /// Tokio runtime it fails with [`PsExecError::NestedRuntime`].
    pub fn start_blocking(&self, cancel: CancellationToken) -> Result<RunReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(PsExecError::NestedRuntime);
        }
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.start(cancel))
    }
}

/// Wait for the pumps to hit EOF after the child exited.
///
/// A grandchild can keep a pipe open past the child's exit, so cancellation
/// still cuts the wait short. Returns `false` if it did.
async fn drain(mut pumps: Vec<JoinHandle<()>>, cancel: &CancellationToken) -> bool {
    for i in 0..pumps.len() {
        tokio::select! {
            _ = &mut pumps[i] => {}
            _ = cancel.cancelled() => {
                debug!("cancelled while draining output; dropping the rest");
                for pump in pumps.iter() {
                    pump.abort();
                }
                return false;
            }
        }
    }
    true
}
