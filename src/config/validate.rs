// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{JobFile, JobTarget, RawJobFile};
use crate::errors::{PsExecError, Result};
use crate::params::check_name;

impl TryFrom<RawJobFile> for JobFile {
    type Error = PsExecError;

    fn try_from(raw: RawJobFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_job(&raw)?;
        let target = into_target(raw.file, raw.command)?;

        Ok(JobFile {
            interpreter: raw.interpreter,
            execution_policy: raw.execution_policy,
            working_directory: raw.working_directory,
            target,
            parameters: raw.parameters,
            secrets: raw.secrets,
            credential: raw.credential,
            base_dir: None,
        })
    }
}

fn validate_raw_job(job: &RawJobFile) -> Result<()> {
    validate_interpreter(job)?;
    validate_names(job)?;
    validate_credential(job)?;
    Ok(())
}

fn into_target(file: Option<PathBuf>, command: Option<String>) -> Result<JobTarget> {
    match (file, command) {
        (Some(_), Some(_)) => Err(PsExecError::ConfigError(
            "job sets both `file` and `command`; pick one".to_string(),
        )),
        (None, None) => Err(PsExecError::ConfigError(
            "job must set either `file` or `command`".to_string(),
        )),
        (None, Some(cmd)) if cmd.trim().is_empty() => Err(PsExecError::ConfigError(
            "`command` must not be empty".to_string(),
        )),
        (Some(file), None) => Ok(JobTarget::File(file)),
        (None, Some(cmd)) => Ok(JobTarget::Command(cmd)),
    }
}

fn validate_interpreter(job: &RawJobFile) -> Result<()> {
    if let Some(interpreter) = &job.interpreter {
        if interpreter.trim().is_empty() {
            return Err(PsExecError::ConfigError(
                "`interpreter` must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_names(job: &RawJobFile) -> Result<()> {
    for name in job.parameters.keys().chain(job.secrets.keys()) {
        check_name(name)?;
    }
    if let Some(name) = job.secrets.keys().find(|k| job.parameters.contains_key(*k)) {
        return Err(PsExecError::DuplicateParameter(name.clone()));
    }
    Ok(())
}

fn validate_credential(job: &RawJobFile) -> Result<()> {
    if let Some(cred) = &job.credential {
        if cred.user_name.trim().is_empty() {
            return Err(PsExecError::ConfigError(
                "[credential].user_name must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}
