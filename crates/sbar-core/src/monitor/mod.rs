//! Contract implemented by every status monitor.
//!
//! A monitor does the actual work (reading a file, calling an API, ...) and formats it.
//! It is owned exclusively by one task supervisor, which drives it through update/render cycles.
mod error;
pub use error::MonitorError;

use async_trait::async_trait;

/// Result of a successful [`Monitor::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep scheduling updates.
    Continue,
    /// Output is final; the task stops after publishing it.
    Finish,
}

/// A unit producing one short line of status text on demand.
///
/// Outcomes of [`Monitor::update`]:
/// - `Ok(Flow::Continue)` renders [`Monitor::render`] and schedules the next run;
/// - `Ok(Flow::Finish)` renders [`Monitor::render`] and stops the task;
/// - `Err(MonitorError::Transient { .. })` renders [`Monitor::render_error`] and retries after backoff;
/// - `Err(MonitorError::Fatal { .. })` renders [`Monitor::render_error`] and stops the task for good.
#[async_trait]
pub trait Monitor: Send + 'static {
    /// Refresh the monitor's data.
    ///
    /// The supervisor puts no timeout on this call.
    async fn update(&mut self) -> Result<Flow, MonitorError>;

    /// Formatted output after a successful update.
    fn render(&self) -> String;

    /// Short, general error output after a failed update.
    fn render_error(&self) -> String;

    /// Stable human-readable label for logs and the control plane.
    fn display_name(&self) -> &str;
}
