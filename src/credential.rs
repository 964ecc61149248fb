//! Alternate-user credentials for the child process.

use std::fmt;

/// A password that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(*********)")
    }
}

/// Domain / user / password triple used to launch the interpreter as another
/// user.
///
/// A missing domain means "current domain". A missing password is accepted
/// here but rejected at launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    domain: Option<String>,
    user_name: String,
    password: Option<Password>,
}

impl Credential {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            domain: None,
            user_name: user_name.into(),
            password: Some(Password::new(password)),
        }
    }

    pub fn with_domain(
        domain: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            domain: Some(domain.into()),
            ..Self::new(user_name, password)
        }
    }

    /// Credential with no password attached. Launching with it fails.
    pub fn without_password(domain: Option<String>, user_name: impl Into<String>) -> Self {
        Self {
            domain,
            user_name: user_name.into(),
            password: None,
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let cred = Credential::with_domain("CORP", "svc", "hunter2");
        let dbg = format!("{cred:?}");
        assert!(dbg.contains("svc"));
        assert!(dbg.contains("CORP"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn missing_domain_means_current_domain() {
        let cred = Credential::new("svc", "pw");
        assert_eq!(cred.domain(), None);
        assert_eq!(cred.password().map(Password::expose), Some("pw"));
    }
}
