use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Script-execution trust level handed to the interpreter.
///
/// The value is passed through verbatim as `-ExecutionPolicy <value>`; this
/// crate attaches no meaning to it beyond formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ExecutionPolicy {
    Default,
    AllSigned,
    Bypass,
    RemoteSigned,
    Restricted,
    Undefined,
    Unrestricted,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        ExecutionPolicy::Default
    }
}

impl ExecutionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPolicy::Default => "Default",
            ExecutionPolicy::AllSigned => "AllSigned",
            ExecutionPolicy::Bypass => "Bypass",
            ExecutionPolicy::RemoteSigned => "RemoteSigned",
            ExecutionPolicy::Restricted => "Restricted",
            ExecutionPolicy::Undefined => "Undefined",
            ExecutionPolicy::Unrestricted => "Unrestricted",
        }
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(ExecutionPolicy::Default),
            "allsigned" => Ok(ExecutionPolicy::AllSigned),
            "bypass" => Ok(ExecutionPolicy::Bypass),
            "remotesigned" => Ok(ExecutionPolicy::RemoteSigned),
            "restricted" => Ok(ExecutionPolicy::Restricted),
            "undefined" => Ok(ExecutionPolicy::Undefined),
            "unrestricted" => Ok(ExecutionPolicy::Unrestricted),
            other => Err(format!(
                "invalid execution policy: {other} (expected one of Default, AllSigned, \
                 Bypass, RemoteSigned, Restricted, Undefined, Unrestricted)"
            )),
        }
    }
}

impl TryFrom<String> for ExecutionPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What the interpreter is asked to run.
///
/// - `File`: the execution data is a path to a script file.
/// - `Command`: the execution data is an inline scriptblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    File,
    Command,
}

/// Which pipe of the child a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}
