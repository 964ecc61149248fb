//! Fluent, eagerly validating configuration for one interpreter run.
//!
//! Every setter checks its input when it is called: a missing script or
//! working directory and a duplicate parameter name fail at the call site, so
//! a broken configuration never reaches launch. [`ExecutorBuilder::build`]
//! freezes the accumulated state into a [`LaunchSpec`] and returns an
//! [`Executor`] bound to it.
//!
//! ```no_run
//! use psexec::builder::ExecutorBuilder;
//! use psexec::context::{ConsoleContext, ContextSource};
//! use psexec::types::ExecutionPolicy;
//!
//! # fn main() -> psexec::errors::Result<()> {
//! let executor = ExecutorBuilder::new(ContextSource::bound(ConsoleContext::new(true)))
//!     .set_execution_policy(ExecutionPolicy::Bypass)
//!     .add_parameter("TARGET", "staging")?
//!     .add_secret("API_TOKEN", "abc123")?
//!     .set_command("Write-Output $env:TARGET")
//!     .build()?;
//! # let _ = executor;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::context::ContextSource;
use crate::credential::Credential;
use crate::errors::{PsExecError, Result};
use crate::exec::Executor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::launch::{LaunchSpec, OutputCapture};
use crate::params::ParameterSet;
use crate::types::{ExecutionMode, ExecutionPolicy};

static SCRIPTBLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^& \{.*\}$").expect("scriptblock pattern is valid")
});

/// Interpreter used when none is configured.
pub fn default_interpreter() -> &'static str {
    if cfg!(windows) { "PowerShell.exe" } else { "pwsh" }
}

/// Wrap `command` as `& { <command> }` unless it already has that shape.
pub fn wrap_command(command: &str) -> String {
    if SCRIPTBLOCK.is_match(command) {
        command.to_string()
    } else {
        format!("& {{ {command} }}")
    }
}

pub struct ExecutorBuilder {
    context: ContextSource,
    fs: Arc<dyn FileSystem>,
    interpreter: String,
    policy: ExecutionPolicy,
    execution: Option<(ExecutionMode, String)>,
    working_directory: Option<PathBuf>,
    parameters: ParameterSet,
    credential: Option<Credential>,
    output_capture: Option<OutputCapture>,
}

impl ExecutorBuilder {
    pub fn new(context: ContextSource) -> Self {
        Self::with_fs(context, Arc::new(RealFileSystem))
    }

    /// Builder whose existence checks go through `fs`.
    pub fn with_fs(context: ContextSource, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            context,
            fs,
            interpreter: default_interpreter().to_string(),
            policy: ExecutionPolicy::default(),
            execution: None,
            working_directory: None,
            parameters: ParameterSet::new(),
            credential: None,
            output_capture: None,
        }
    }

    pub fn interpreter(&mut self, program: impl Into<String>) -> &mut Self {
        self.interpreter = program.into();
        self
    }

    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self> {
        self.parameters.add(name, value)?;
        Ok(self)
    }

    /// Add a batch of parameters. A duplicate anywhere rejects the whole batch.
    pub fn add_parameters<I, K, V>(&mut self, params: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters.add_all(params)?;
        Ok(self)
    }

    /// Add a parameter whose value is masked in every emitted line.
    ///
    /// The child still receives the real value in its environment.
    pub fn add_secret(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self> {
        self.parameters.add_secret(name, value)?;
        Ok(self)
    }

    pub fn set_working_directory(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        if !self.fs.is_dir(path) {
            return Err(PsExecError::NotFound {
                kind: "working directory",
                path: path.to_path_buf(),
            });
        }
        self.working_directory = Some(path.to_path_buf());
        Ok(self)
    }

    pub fn set_execution_policy(&mut self, policy: ExecutionPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    pub fn set_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        if !self.fs.is_file(path) {
            return Err(PsExecError::NotFound {
                kind: "file",
                path: path.to_path_buf(),
            });
        }
        self.execution = Some((ExecutionMode::File, path.display().to_string()));
        Ok(self)
    }

    pub fn set_command(&mut self, command: impl AsRef<str>) -> &mut Self {
        let wrapped = wrap_command(command.as_ref());
        self.execution = Some((ExecutionMode::Command, wrapped));
        self
    }

    /// Run the interpreter as another user. The password joins the secret set.
    pub fn set_credential(&mut self, credential: Credential) -> &mut Self {
        if let Some(pw) = credential.password() {
            self.parameters.register_secret(pw.expose());
        }
        self.credential = Some(credential);
        self
    }

    /// Receive every output and error line before redaction.
    pub fn set_capture_output<F>(&mut self, capture: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.output_capture = Some(Arc::new(capture));
        self
    }

    pub fn mode(&self) -> Option<ExecutionMode> {
        self.execution.as_ref().map(|(mode, _)| *mode)
    }

    pub fn execution_data(&self) -> Option<&str> {
        self.execution.as_ref().map(|(_, data)| data.as_str())
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Freeze the configuration into a launch spec.
    pub fn to_launch_spec(&self) -> Result<LaunchSpec> {
        let (mode, data) = self
            .execution
            .clone()
            .ok_or(PsExecError::MissingExecutionData)?;

        let spec = LaunchSpec::new(
            self.interpreter.clone(),
            mode,
            self.policy,
            data,
            self.working_directory.clone(),
            self.parameters.clone(),
            self.credential.clone(),
            self.output_capture.clone(),
        );
        debug!(
            interpreter = %spec.interpreter(),
            mode = ?spec.mode(),
            policy = %spec.policy(),
            parameters = spec.parameters().len(),
            "launch spec built"
        );
        Ok(spec)
    }

    pub fn build(&self) -> Result<Executor> {
        Ok(Executor::new(self.to_launch_spec()?, self.context.clone()))
    }
}

impl std::fmt::Debug for ExecutorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorBuilder")
            .field("context", &self.context)
            .field("interpreter", &self.interpreter)
            .field("policy", &self.policy)
            .field("execution", &self.execution)
            .field("working_directory", &self.working_directory)
            .field("parameters", &self.parameters.len())
            .field("credential", &self.credential)
            .finish()
    }
}
