// src/exec/credential.rs

//! Alternate-user launch settings.

use tokio::process::Command;
#[cfg(unix)]
use tracing::warn;

use crate::credential::Credential;
use crate::errors::{PsExecError, Result};

/// Configure `cmd` to run as the credential's user.
///
/// The password must be present. On Unix the user name is resolved to a
/// uid/gid pair; switching to it needs the privileges to do so, and the
/// domain has no meaning there.
///
/// The password itself is never verified on Unix. A privileged host launches
/// the child as the named user whatever password was supplied.
pub fn apply(cmd: &mut Command, credential: &Credential) -> Result<()> {
    if credential.password().is_none() {
        return Err(PsExecError::Credential(
            "Password must not be empty".to_string(),
        ));
    }
    apply_platform(cmd, credential)
}

#[cfg(unix)]
fn apply_platform(cmd: &mut Command, credential: &Credential) -> Result<()> {
    if let Some(domain) = credential.domain() {
        warn!(domain, "credential domain is ignored on this platform");
    }
    let (uid, gid) = lookup_user(credential.user_name())?;
    cmd.uid(uid).gid(gid);
    Ok(())
}

#[cfg(not(unix))]
fn apply_platform(_cmd: &mut Command, credential: &Credential) -> Result<()> {
    Err(PsExecError::Credential(format!(
        "launching as '{}' is not supported on this platform",
        credential.user_name()
    )))
}

#[cfg(unix)]
fn lookup_user(name: &str) -> Result<(u32, u32)> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let c_name = CString::new(name)
        .map_err(|_| PsExecError::Credential(format!("invalid user name: {name:?}")))?;
    let mut pwd = MaybeUninit::<libc::passwd>::uninit();
    let mut buf = vec![0 as libc::c_char; 16 * 1024];
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    // Safety: every pointer refers to a live local buffer of the stated size.
    let rc = unsafe {
        libc::getpwnam_r(
            c_name.as_ptr(),
            pwd.as_mut_ptr(),
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 {
        return Err(PsExecError::Credential(format!(
            "looking up user '{name}' failed: {}",
            std::io::Error::from_raw_os_error(rc)
        )));
    }
    if result.is_null() {
        return Err(PsExecError::Credential(format!("unknown user: {name}")));
    }

    // Safety: a non-null result means getpwnam_r filled `pwd`.
    let pwd = unsafe { pwd.assume_init() };
    Ok((pwd.pw_uid, pwd.pw_gid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_password_is_a_credential_error() {
        let mut cmd = Command::new("true");
        let cred = Credential::without_password(None, "root");
        let err = apply(&mut cmd, &cred).unwrap_err();
        assert!(matches!(err, PsExecError::Credential(ref m) if m.contains("Password")));
    }

    #[cfg(unix)]
    #[test]
    fn root_resolves_to_uid_zero() {
        assert_eq!(lookup_user("root").unwrap(), (0, 0));
    }

    #[cfg(unix)]
    #[test]
    fn unknown_user_is_a_credential_error() {
        let err = lookup_user("no-such-user-psexec-test").unwrap_err();
        assert!(matches!(err, PsExecError::Credential(ref m) if m.contains("unknown user")));
    }
}
