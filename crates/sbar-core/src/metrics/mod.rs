//! Metrics collection abstraction for the engine.
//!
//! Task supervisors and the control plane report through a [`MetricsBackend`].
//! Backends (prometheus, statsd, etc) are injected via `EngineBuilder::with_metrics`.
mod backend;
pub use backend::{FinishReason, MetricsBackend, MetricsHandle, UpdateOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
