//! Secret masking for emitted lines.
//!
//! Every occurrence of every secret is replaced with the fixed-width [`MASK`],
//! so the mask never reveals how long a secret was. Secrets are applied in
//! registration order, one after another: a secret that overlaps another one
//! may only be partly masked if the earlier replacement already consumed the
//! shared characters.

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use crate::context::ExecutionContext;
use crate::types::OutputStream;

pub const MASK: &str = "*********";

/// Ordered list of values to mask.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    secrets: Vec<String>,
}

impl Redactor {
    /// Empty secrets are dropped; they would match between every character.
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secrets: secrets
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn redact<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(line);
        for secret in self.secrets.iter() {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), MASK));
            }
        }
        out
    }
}

/// Writes redacted lines into an execution context.
///
/// Stdout and stderr are pumped concurrently; the lock keeps an error line's
/// color/line/reset sequence from interleaving with another line.
pub struct SecureLineWriter {
    context: Arc<dyn ExecutionContext>,
    redactor: Arc<Redactor>,
    lock: Mutex<()>,
}

impl SecureLineWriter {
    pub fn new(context: Arc<dyn ExecutionContext>, redactor: Arc<Redactor>) -> Self {
        Self {
            context,
            redactor,
            lock: Mutex::new(()),
        }
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn write_line(&self, line: &str, stream: OutputStream) {
        let clean = self.redactor.redact(line);
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        match stream {
            OutputStream::Stdout => self.context.write_line(&clean),
            OutputStream::Stderr => {
                self.context.set_error_color();
                self.context.write_line(&clean);
                self.context.reset_color();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_every_occurrence() {
        let r = Redactor::new(["abc123"]);
        assert_eq!(r.redact("token=abc123 ok abc123"), "token=********* ok *********");
    }

    #[test]
    fn mask_width_does_not_depend_on_secret_length() {
        let r = Redactor::new(["a1", "a-much-longer-secret"]);
        assert_eq!(r.redact("a1"), MASK);
        assert_eq!(r.redact("a-much-longer-secret"), MASK);
    }

    #[test]
    fn clean_lines_are_borrowed() {
        let r = Redactor::new(["secret"]);
        assert!(matches!(r.redact("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn empty_secret_is_ignored() {
        let r = Redactor::new(["", "x"]);
        assert_eq!(r.redact("axb"), format!("a{MASK}b"));
    }

    #[test]
    fn overlapping_secrets_apply_in_order() {
        // "abcdef" goes first and consumes "cd", so "cd" has nothing left to match.
        let r = Redactor::new(["abcdef", "cd"]);
        assert_eq!(r.redact("abcdef cd"), format!("{MASK} {MASK}"));

        // The shorter secret first breaks up the longer one.
        let r = Redactor::new(["cd", "abcdef"]);
        assert_eq!(r.redact("abcdef"), format!("ab{MASK}ef"));
    }
}
