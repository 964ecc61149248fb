// src/config/mod.rs

//! Job files: a TOML description of one interpreter run.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate the file's own invariants (`validate.rs`).
//!
//! Filesystem checks on the script and working directory are left to the
//! builder, which runs them when [`JobFile::into_builder`] feeds it.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_and_validate_with, load_from_path};
pub use model::{CredentialSection, JobFile, JobTarget, RawJobFile};
