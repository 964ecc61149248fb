use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use psexec::config::{load_and_validate, load_and_validate_with, JobTarget};
use psexec::errors::PsExecError;
use psexec::fs::mock::MockFileSystem;
use psexec::fs::RealFileSystem;
use psexec::types::{ExecutionMode, ExecutionPolicy};
use psexec_test_utils::RecordingContext;
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

fn job_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_job_file_feeds_the_builder() -> TestResult {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("work"))?;
    std::fs::write(dir.path().join("deploy.ps1"), "Write-Output deploy")?;
    let path = dir.path().join("job.toml");
    std::fs::write(
        &path,
        r#"
interpreter = "/usr/bin/pwsh"
execution_policy = "bypass"
working_directory = "work"
file = "deploy.ps1"

[parameters]
TARGET = "staging"

[secrets]
API_TOKEN = "abc123"

[credential]
domain = "CORP"
user_name = "svc-deploy"
password = "pw"
"#,
    )?;

    let job = load_and_validate(&path)?;
    assert_eq!(job.execution_policy(), ExecutionPolicy::Bypass);
    assert_eq!(job.target(), &JobTarget::File("deploy.ps1".into()));

    let ctx = RecordingContext::new();
    let builder = job.into_builder(ctx.source(), Arc::new(RealFileSystem))?;
    let spec = builder.to_launch_spec()?;

    assert_eq!(spec.interpreter(), "/usr/bin/pwsh");
    assert_eq!(spec.mode(), ExecutionMode::File);
    assert_eq!(spec.working_directory(), Some(&dir.path().join("work")));
    assert_eq!(
        spec.arguments(),
        format!(
            "-NoLogo -NoProfile -NonInteractive -ExecutionPolicy Bypass -File {}",
            dir.path().join("deploy.ps1").display()
        )
    );
    assert_eq!(spec.parameters().get("TARGET").unwrap().value, "staging");
    assert!(spec.parameters().get("API_TOKEN").unwrap().is_secret);
    assert_eq!(spec.secrets(), &["abc123".to_string(), "pw".to_string()]);
    assert_eq!(spec.credential().unwrap().user_name(), "svc-deploy");
    Ok(())
}

#[test]
fn command_job_is_wrapped() -> TestResult {
    let file = job_file(r#"command = "Get-Date""#);
    let job = load_and_validate(file.path())?;
    let builder = job.into_builder(RecordingContext::new().source(), Arc::new(RealFileSystem))?;

    assert_eq!(builder.execution_data(), Some("& { Get-Date }"));
    assert_eq!(builder.to_launch_spec()?.policy(), ExecutionPolicy::Default);
    Ok(())
}

#[test]
fn file_and_command_together_is_a_config_error() {
    let file = job_file(
        r#"
file = "a.ps1"
command = "Get-Date"
"#,
    );
    match load_and_validate(file.path()) {
        Err(PsExecError::ConfigError(msg)) => assert!(msg.contains("both")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn job_without_target_is_a_config_error() {
    let file = job_file("execution_policy = \"Bypass\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(PsExecError::ConfigError(_))
    ));
}

#[test]
fn name_in_both_tables_is_a_duplicate() {
    let file = job_file(
        r#"
command = "Get-Date"

[parameters]
TOKEN = "a"

[secrets]
TOKEN = "b"
"#,
    );
    match load_and_validate(file.path()) {
        Err(PsExecError::DuplicateParameter(name)) => assert_eq!(name, "TOKEN"),
        other => panic!("expected DuplicateParameter, got {other:?}"),
    }
}

#[test]
fn unknown_policy_and_fields_are_toml_errors() {
    let file = job_file(
        r#"
command = "x"
execution_policy = "Sometimes"
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(PsExecError::TomlError(_))
    ));

    let file = job_file(
        r#"
command = "x"
timeout = 5
"#,
    );
    assert!(matches!(
        load_and_validate(file.path()),
        Err(PsExecError::TomlError(_))
    ));
}

#[test]
fn missing_script_surfaces_when_feeding_the_builder() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("jobs/job.toml", r#"file = "missing.ps1""#);

    let job = load_and_validate_with(&fs, "jobs/job.toml")?;
    let err = job
        .into_builder(RecordingContext::new().source(), Arc::new(fs))
        .unwrap_err();

    match err {
        PsExecError::NotFound { kind, path } => {
            assert_eq!(kind, "file");
            assert_eq!(path, Path::new("jobs/missing.ps1"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn relative_paths_resolve_against_the_job_directory() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("jobs/job.toml", "file = \"run.ps1\"\nworking_directory = \"out\"\n");
    fs.add_file("jobs/run.ps1", "");
    fs.add_dir("jobs/out");

    let job = load_and_validate_with(&fs, "jobs/job.toml")?;
    let builder = job.into_builder(RecordingContext::new().source(), Arc::new(fs))?;

    assert_eq!(builder.execution_data(), Some("jobs/run.ps1"));
    assert_eq!(builder.working_directory(), Some(Path::new("jobs/out")));
    Ok(())
}

#[test]
fn credential_without_password_loads_but_has_none() -> TestResult {
    let file = job_file(
        r#"
command = "whoami"

[credential]
user_name = "svc"
"#,
    );
    let job = load_and_validate(file.path())?;
    let builder = job.into_builder(RecordingContext::new().source(), Arc::new(RealFileSystem))?;

    let cred = builder.credential().unwrap();
    assert_eq!(cred.user_name(), "svc");
    assert!(cred.password().is_none());
    assert!(builder.parameters().secrets().is_empty());
    Ok(())
}
