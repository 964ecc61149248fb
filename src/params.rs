//! Named parameters destined for the child's environment, plus the set of
//! values that must be masked in its output.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::errors::{PsExecError, Result};

/// Reject names that cannot be an environment variable name as given.
pub fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(PsExecError::ConfigError(format!(
            "invalid parameter name {name:?}: must be non-empty without '=' or NUL"
        )));
    }
    Ok(())
}

/// One environment variable handed to the child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub is_secret: bool,
}

/// Parameter map keyed by name, with a parallel list of secret values.
///
/// Names are unique: adding a name twice is an error, never an overwrite.
/// Secret values are deduplicated by value, so two names sharing a value
/// produce a single redaction pattern.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    params: BTreeMap<String, Parameter>,
    secrets: Vec<String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.insert(name.into(), value.into(), false)
    }

    /// Add every entry or none of them.
    pub fn add_all<I, K, V>(&mut self, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let batch: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut seen = HashSet::new();
        for (name, _) in batch.iter() {
            check_name(name)?;
            if self.params.contains_key(name) || !seen.insert(name.as_str()) {
                return Err(PsExecError::DuplicateParameter(name.clone()));
            }
        }

        for (name, value) in batch {
            self.params.insert(
                name.clone(),
                Parameter {
                    name,
                    value,
                    is_secret: false,
                },
            );
        }
        Ok(())
    }

    pub fn add_secret(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.insert(name.into(), value.clone(), true)?;
        self.register_secret(value);
        Ok(())
    }

    /// Track a value for redaction without exposing it as a parameter.
    pub fn register_secret(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            warn!("ignoring empty secret value for redaction");
            return;
        }
        if !self.secrets.contains(&value) {
            self.secrets.push(value);
        }
    }

    fn insert(&mut self, name: String, value: String, is_secret: bool) -> Result<()> {
        check_name(&name)?;
        if self.params.contains_key(&name) {
            return Err(PsExecError::DuplicateParameter(name));
        }
        self.params.insert(
            name.clone(),
            Parameter {
                name,
                value,
                is_secret,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    /// `(name, value)` pairs for the child's environment, secrets included.
    pub fn env_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .values()
            .map(|p| (p.name.as_str(), p.value.as_str()))
    }

    /// Secret values in registration order.
    pub fn secrets(&self) -> &[String] {
        &self.secrets
    }
}
