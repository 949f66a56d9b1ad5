use std::sync::Arc;

/// Outcome of a single `Monitor::update` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Update succeeded.
    Success,
    /// Update failed and will be retried after backoff.
    Transient,
    /// Update failed and the task stops.
    Fatal,
}

impl UpdateOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            UpdateOutcome::Success => "success",
            UpdateOutcome::Transient => "transient",
            UpdateOutcome::Fatal => "fatal",
        }
    }
}

/// Why a task loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Single-shot task ran once, or the monitor reported its output as final.
    Completed,
    /// Monitor reported an unrecoverable error.
    Failed,
    /// Stop signal received.
    Stopped,
}

impl FinishReason {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            FinishReason::Completed => "completed",
            FinishReason::Failed => "failed",
            FinishReason::Stopped => "stopped",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected via `EngineBuilder::with_metrics` and shared by all task supervisors.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record one monitor update with its outcome and duration.
    ///
    /// # Arguments
    /// - `module`: Module id of the task
    /// - `outcome`: How the update ended
    /// - `duration_ms`: Update time in milliseconds
    fn record_update(&self, module: &str, outcome: UpdateOutcome, duration_ms: u64);
    /// Record the terminal state of a task loop.
    fn record_task_finished(&self, module: &str, reason: FinishReason);
    /// Record a control-plane request rejected because a signal was already pending.
    ///
    /// # Arguments
    /// - `op`: Operation name (`refresh`, `refresh_all`, ...)
    fn record_control_rejected(&self, op: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
