// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{JobFile, RawJobFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Read and deserialize a job file without validating it.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawJobFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let job: RawJobFile = toml::from_str(&contents)?;
    Ok(job)
}

/// Load a job file from disk and validate it.
///
/// Relative `file` and `working_directory` entries are resolved against the
/// job file's own directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobFile> {
    load_and_validate_with(&RealFileSystem, path)
}

pub fn load_and_validate_with(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<JobFile> {
    let path = path.as_ref();
    let raw = load_from_path(fs, path)?;
    let job = JobFile::try_from(raw)?;
    Ok(job.with_base_dir(job_root_dir(path)))
}

/// Directory relative job paths are resolved against.
///
/// A bare file name like `job.toml` has an empty parent; that maps to `.`.
fn job_root_dir(job_path: &Path) -> PathBuf {
    match job_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
