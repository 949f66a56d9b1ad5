//! Output sinks receiving the aggregated bar string.
use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use tracing::trace;

/// Destination of the aggregated output (window title, terminal line, ...).
///
/// Called once per aggregator tick. Implementations must not block for long and handle their own failures.
pub trait DisplaySink: Send + Sync + 'static {
    fn display(&self, output: &str);
}

/// Shared handle to a display sink.
pub type SinkHandle = Arc<dyn DisplaySink>;

/// Writes each output as a line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl DisplaySink for StdoutSink {
    fn display(&self, output: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{output}").and_then(|_| out.flush()) {
            trace!(error = %e, "stdout sink write failed");
        }
    }
}

/// Keeps every displayed output in memory.
///
/// Useful for tests and for embedding the engine behind another renderer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    history: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last displayed output, if any.
    pub fn last(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    /// All displayed outputs in order.
    pub fn history(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DisplaySink for MemorySink {
    fn display(&self, output: &str) {
        self.lock().push(output.to_string());
    }
}
