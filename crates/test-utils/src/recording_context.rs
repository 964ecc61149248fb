use std::sync::{Arc, Mutex};

use psexec::context::{ContextSource, ExecutionContext};
use tokio::sync::Notify;

/// One line as the context received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    pub error: bool,
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<Entry>,
    error_color: bool,
}

/// Execution context that records every line with its color state.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    state: Arc<Mutex<State>>,
    written: Arc<Notify>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> ContextSource {
        ContextSource::Bound(Arc::new(self.clone()))
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.text).collect()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| !e.error)
            .map(|e| e.text)
            .collect()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.error)
            .map(|e| e.text)
            .collect()
    }

    /// Wait until some line contains `needle`.
    pub async fn wait_for(&self, needle: &str) {
        loop {
            let notified = self.written.notified();
            if self.lines().iter().any(|l| l.contains(needle)) {
                return;
            }
            notified.await;
        }
    }
}

impl ExecutionContext for RecordingContext {
    fn write_line(&self, text: &str) {
        {
            let mut state = self.state.lock().unwrap();
            let error = state.error_color;
            state.entries.push(Entry {
                text: text.to_string(),
                error,
            });
        }
        self.written.notify_waiters();
    }

    fn set_error_color(&self) {
        self.state.lock().unwrap().error_color = true;
    }

    fn reset_color(&self) {
        self.state.lock().unwrap().error_color = false;
    }
}
