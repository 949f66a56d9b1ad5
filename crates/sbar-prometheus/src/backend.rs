use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use sbar_core::metrics::{FinishReason, MetricsBackend, UpdateOutcome};

const NAMESPACE: &str = "sbar";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// - `module`: one value per registered task
/// - `outcome`: "success", "transient", "fatal"
/// - `reason`: "completed", "failed", "stopped"
/// - `op`: "refresh", "refresh_all"
#[derive(Clone)]
pub struct PrometheusMetrics {
    updates: CounterVec,
    update_duration: HistogramVec,
    tasks_finished: CounterVec,
    control_rejected: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create the backend and register its metrics in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let updates = CounterVec::new(
            Opts::new("updates_total", "Monitor updates by outcome").namespace(NAMESPACE),
            &["module", "outcome"],
        )?;
        registry.register(Box::new(updates.clone()))?;

        let update_duration = HistogramVec::new(
            HistogramOpts::new("update_duration_seconds", "Monitor update duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["module"],
        )?;
        registry.register(Box::new(update_duration.clone()))?;

        let tasks_finished = CounterVec::new(
            Opts::new("tasks_finished_total", "Task loops that reached their terminal state")
                .namespace(NAMESPACE),
            &["module", "reason"],
        )?;
        registry.register(Box::new(tasks_finished.clone()))?;

        let control_rejected = CounterVec::new(
            Opts::new(
                "control_rejected_total",
                "Control requests rejected because a signal was already pending",
            )
            .namespace(NAMESPACE),
            &["op"],
        )?;
        registry.register(Box::new(control_rejected.clone()))?;

        Ok(Self {
            updates,
            update_duration,
            tasks_finished,
            control_rejected,
            registry,
        })
    }

    /// Create the backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Content type of [`PrometheusMetrics::encode`] output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Underlying registry, for registering custom metrics alongside.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_update(&self, module: &str, outcome: UpdateOutcome, duration_ms: u64) {
        self.updates
            .with_label_values(&[module, outcome.as_label()])
            .inc();
        self.update_duration
            .with_label_values(&[module])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_task_finished(&self, module: &str, reason: FinishReason) {
        self.tasks_finished
            .with_label_values(&[module, reason.as_label()])
            .inc();
    }

    fn record_control_rejected(&self, op: &str) {
        self.control_rejected.with_label_values(&[op]).inc();
    }
}
