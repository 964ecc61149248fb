//! Immutable description of one interpreter launch.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::credential::Credential;
use crate::params::ParameterSet;
use crate::types::{ExecutionMode, ExecutionPolicy};

/// Callback receiving every raw (unredacted) output and error line.
pub type OutputCapture = Arc<dyn Fn(&str) + Send + Sync>;

const COMMON_FLAGS: [&str; 3] = ["-NoLogo", "-NoProfile", "-NonInteractive"];

/// Everything the launcher needs, frozen at build time.
///
/// `arguments` is derived from mode, policy and execution data when the spec
/// is created and cannot be changed afterwards.
#[derive(Clone)]
pub struct LaunchSpec {
    interpreter: String,
    mode: ExecutionMode,
    policy: ExecutionPolicy,
    execution_data: String,
    working_directory: Option<PathBuf>,
    parameters: ParameterSet,
    credential: Option<Credential>,
    output_capture: Option<OutputCapture>,
    arguments: String,
}

impl LaunchSpec {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        interpreter: String,
        mode: ExecutionMode,
        policy: ExecutionPolicy,
        execution_data: String,
        working_directory: Option<PathBuf>,
        parameters: ParameterSet,
        credential: Option<Credential>,
        output_capture: Option<OutputCapture>,
    ) -> Self {
        let arguments = render_arguments(mode, policy, &execution_data);
        Self {
            interpreter,
            mode,
            policy,
            execution_data,
            working_directory,
            parameters,
            credential,
            output_capture,
            arguments,
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    /// Script path (file mode) or wrapped scriptblock (command mode).
    pub fn execution_data(&self) -> &str {
        &self.execution_data
    }

    pub fn working_directory(&self) -> Option<&PathBuf> {
        self.working_directory.as_ref()
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn secrets(&self) -> &[String] {
        self.parameters.secrets()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn output_capture(&self) -> Option<&OutputCapture> {
        self.output_capture.as_ref()
    }

    /// Interpreter argument string, exactly as the templates render it.
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// The same arguments as separate argv entries, used to spawn the child.
    ///
    /// The command body is one entry; the platform layer quotes it, which is
    /// what the double quotes in [`arguments`](Self::arguments) stand for.
    pub fn argv(&self) -> Vec<String> {
        let mut argv: Vec<String> = COMMON_FLAGS.iter().map(|s| s.to_string()).collect();
        argv.push("-ExecutionPolicy".to_string());
        argv.push(self.policy.to_string());
        argv.push(mode_flag(self.mode).to_string());
        argv.push(self.execution_data.clone());
        argv
    }
}

impl fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchSpec")
            .field("interpreter", &self.interpreter)
            .field("mode", &self.mode)
            .field("policy", &self.policy)
            .field("working_directory", &self.working_directory)
            .field("parameters", &self.parameters.len())
            .field("secrets", &self.parameters.secrets().len())
            .field("credential", &self.credential)
            .field("output_capture", &self.output_capture.is_some())
            .field("arguments", &self.arguments)
            .finish()
    }
}

fn mode_flag(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::File => "-File",
        ExecutionMode::Command => "-Command",
    }
}

fn render_arguments(mode: ExecutionMode, policy: ExecutionPolicy, data: &str) -> String {
    let common = COMMON_FLAGS.join(" ");
    match mode {
        ExecutionMode::File => format!("{common} -ExecutionPolicy {policy} -File {data}"),
        ExecutionMode::Command => format!("{common} -ExecutionPolicy {policy} -Command \"{data}\""),
    }
}
