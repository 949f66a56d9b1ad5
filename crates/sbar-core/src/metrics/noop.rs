use crate::metrics::backend::{FinishReason, MetricsBackend, UpdateOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_update(&self, _: &str, _: UpdateOutcome, _: u64) {}

    #[inline(always)]
    fn record_task_finished(&self, _: &str, _: FinishReason) {}

    #[inline(always)]
    fn record_control_rejected(&self, _: &str) {}
}
