// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::builder::ExecutorBuilder;
use crate::context::ContextSource;
use crate::credential::Credential;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::ExecutionPolicy;

/// Job file as read from TOML, before validation.
///
/// ```toml
/// interpreter = "pwsh"
/// execution_policy = "Bypass"
/// working_directory = "work"
/// file = "deploy.ps1"
///
/// [parameters]
/// TARGET = "staging"
///
/// [secrets]
/// API_TOKEN = "abc123"
///
/// [credential]
/// domain = "CORP"
/// user_name = "svc-deploy"
/// password = "..."
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawJobFile {
    /// Interpreter binary; the platform default when absent.
    #[serde(default)]
    pub interpreter: Option<String>,

    #[serde(default)]
    pub execution_policy: ExecutionPolicy,

    /// Relative paths resolve against the job file's directory.
    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    /// Script to run. Exactly one of `file` and `command` must be set.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Inline command, wrapped as a scriptblock if needed.
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    /// Parameters whose values are masked in output.
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,

    #[serde(default)]
    pub credential: Option<CredentialSection>,
}

/// `[credential]` table.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialSection {
    #[serde(default)]
    pub domain: Option<String>,
    pub user_name: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSection")
            .field("domain", &self.domain)
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "*********"))
            .finish()
    }
}

impl From<CredentialSection> for Credential {
    fn from(section: CredentialSection) -> Self {
        match (section.domain, section.password) {
            (Some(domain), Some(pw)) => Credential::with_domain(domain, section.user_name, pw),
            (None, Some(pw)) => Credential::new(section.user_name, pw),
            (domain, None) => Credential::without_password(domain, section.user_name),
        }
    }
}

/// What a validated job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTarget {
    File(PathBuf),
    Command(String),
}

/// A validated job file.
///
/// Constructed via `TryFrom<RawJobFile>`; see `validate.rs`.
#[derive(Debug, Clone)]
pub struct JobFile {
    pub(crate) interpreter: Option<String>,
    pub(crate) execution_policy: ExecutionPolicy,
    pub(crate) working_directory: Option<PathBuf>,
    pub(crate) target: JobTarget,
    pub(crate) parameters: BTreeMap<String, String>,
    pub(crate) secrets: BTreeMap<String, String>,
    pub(crate) credential: Option<CredentialSection>,
    pub(crate) base_dir: Option<PathBuf>,
}

impl JobFile {
    pub fn target(&self) -> &JobTarget {
        &self.target
    }

    pub fn execution_policy(&self) -> ExecutionPolicy {
        self.execution_policy
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn secrets(&self) -> &BTreeMap<String, String> {
        &self.secrets
    }

    /// Resolve relative paths against `dir` (normally the job file's folder).
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Feed the job into a fresh builder, running all of its checks.
    pub fn into_builder(
        self,
        context: ContextSource,
        fs: Arc<dyn FileSystem>,
    ) -> Result<ExecutorBuilder> {
        let mut builder = ExecutorBuilder::with_fs(context, fs);

        if let Some(interpreter) = &self.interpreter {
            builder.interpreter(interpreter.clone());
        }
        builder.set_execution_policy(self.execution_policy);
        if let Some(dir) = &self.working_directory {
            builder.set_working_directory(self.resolve(dir))?;
        }
        builder.add_parameters(self.parameters.clone())?;
        for (name, value) in self.secrets.iter() {
            builder.add_secret(name.clone(), value.clone())?;
        }
        if let Some(section) = self.credential.clone() {
            builder.set_credential(section.into());
        }
        match &self.target {
            JobTarget::File(path) => {
                builder.set_file(self.resolve(path))?;
            }
            JobTarget::Command(text) => {
                builder.set_command(text);
            }
        }

        Ok(builder)
    }
}
