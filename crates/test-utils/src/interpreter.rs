//! A POSIX-shell stand-in for PowerShell.
//!
//! It accepts the same leading flags, then runs `-File <path>` with `/bin/sh`
//! and `-Command "& { body }"` as `sh -c body`. Process tests use it so they
//! run on machines without PowerShell.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
while [ "$#" -gt 0 ]; do
  case "$1" in
    -File)
      shift
      exec /bin/sh "$1"
      ;;
    -Command)
      shift
      body=$(printf '%s' "$1" | sed -e 's/^& { //' -e 's/ }$//')
      exec /bin/sh -c "$body"
      ;;
  esac
  shift
done
echo "fake interpreter: no -File or -Command given" >&2
exit 64
"#;

/// Fake interpreter installed in its own temp directory.
pub struct FakeInterpreter {
    dir: TempDir,
    program: PathBuf,
}

static SHARED: OnceLock<FakeInterpreter> = OnceLock::new();

impl FakeInterpreter {
    /// One interpreter per test binary.
    ///
    /// Installing lazily from many tests at once races with their spawns:
    /// a fork that inherits the still-open script fd makes exec fail with
    /// ETXTBSY. Every caller blocks here until the single install is done.
    pub fn shared() -> &'static FakeInterpreter {
        SHARED.get_or_init(|| Self::install().expect("installing fake interpreter"))
    }

    pub fn install() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let program = dir.path().join("fake-pwsh");
        fs::write(&program, SCRIPT)?;
        make_executable(&program)?;
        Ok(Self { dir, program })
    }

    pub fn program(&self) -> String {
        self.program.display().to_string()
    }

    /// Scratch directory that lives as long as the interpreter.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Write a `/bin/sh` script body to `dir/name` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
