//! Diagnostic sink for non-fatal conversion warnings.
//!
//! Configuration errors, cast failures, and structural assignment failures
//! degrade a single field, never the batch. They are routed through a
//! [`DiagnosticSink`] so the conversion core stays free of direct console
//! writes and tests can assert on the exact warnings emitted.

use std::sync::Mutex;

use log::warn;

pub trait DiagnosticSink {
    fn warn(&self, message: String);
}

/// Production sink: forwards every warning to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn warn(&self, message: String) {
        warn!("{message}");
    }
}

/// Collecting sink used by tests to inspect emitted warnings.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("diagnostic sink lock").clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages
            .lock()
            .expect("diagnostic sink lock")
            .is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, message: String) {
        self.messages
            .lock()
            .expect("diagnostic sink lock")
            .push(message);
    }
}
