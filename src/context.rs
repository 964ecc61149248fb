//! The host-side handle that receives a run's console output.
//!
//! A job host hands the launcher an [`ExecutionContext`] either directly or
//! through a [`ContextAccessor`] that knows which job is running right now.
//! The launcher resolves the context at the start of every run and never
//! keeps it around afterwards.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Console-style line sink for one job execution.
pub trait ExecutionContext: Send + Sync {
    fn write_line(&self, text: &str);
    fn set_error_color(&self);
    fn reset_color(&self);
}

/// Lookup of the context belonging to the currently executing job.
pub trait ContextAccessor: Send + Sync {
    fn current(&self) -> Option<Arc<dyn ExecutionContext>>;
}

/// Where a launcher obtains its execution context.
#[derive(Clone)]
pub enum ContextSource {
    Bound(Arc<dyn ExecutionContext>),
    Ambient(Arc<dyn ContextAccessor>),
}

impl ContextSource {
    pub fn bound(ctx: impl ExecutionContext + 'static) -> Self {
        ContextSource::Bound(Arc::new(ctx))
    }

    pub fn ambient(accessor: impl ContextAccessor + 'static) -> Self {
        ContextSource::Ambient(Arc::new(accessor))
    }

    pub fn resolve(&self) -> Option<Arc<dyn ExecutionContext>> {
        match self {
            ContextSource::Bound(ctx) => Some(Arc::clone(ctx)),
            ContextSource::Ambient(accessor) => accessor.current(),
        }
    }
}

impl fmt::Debug for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSource::Bound(_) => f.write_str("ContextSource::Bound"),
            ContextSource::Ambient(_) => f.write_str("ContextSource::Ambient"),
        }
    }
}

const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Execution context that writes to the process's own stdout.
///
/// Error color is rendered as ANSI red when `color` is enabled.
#[derive(Debug, Default)]
pub struct ConsoleContext {
    color: bool,
    erroring: Mutex<bool>,
}

impl ConsoleContext {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            erroring: Mutex::new(false),
        }
    }
}

impl ExecutionContext for ConsoleContext {
    fn write_line(&self, text: &str) {
        let erroring = self.erroring.lock().map(|g| *g).unwrap_or(false);
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing the run over.
        let _ = if self.color && erroring {
            writeln!(out, "{ANSI_RED}{text}{ANSI_RESET}")
        } else {
            writeln!(out, "{text}")
        };
    }

    fn set_error_color(&self) {
        if let Ok(mut g) = self.erroring.lock() {
            *g = true;
        }
    }

    fn reset_color(&self) {
        if let Ok(mut g) = self.erroring.lock() {
            *g = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl ExecutionContext for Silent {
        fn write_line(&self, _text: &str) {}
        fn set_error_color(&self) {}
        fn reset_color(&self) {}
    }

    struct NoJob;

    impl ContextAccessor for NoJob {
        fn current(&self) -> Option<Arc<dyn ExecutionContext>> {
            None
        }
    }

    #[test]
    fn bound_source_always_resolves() {
        let source = ContextSource::bound(Silent);
        assert!(source.resolve().is_some());
    }

    #[test]
    fn ambient_source_without_job_resolves_to_none() {
        let source = ContextSource::ambient(NoJob);
        assert!(source.resolve().is_none());
    }
}
