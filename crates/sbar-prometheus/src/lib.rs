//! Prometheus metrics backend for the statusbar engine.
//!
//! [`PrometheusMetrics`] implements [`sbar_core::metrics::MetricsBackend`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sbar_core::prelude::*;
//! use sbar_model::EngineConfig;
//! use sbar_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let engine = Engine::builder(EngineConfig::default())
//!     .with_metrics(Arc::new(metrics.clone()))
//!     .build()?;
//!
//! // serve `metrics.encode()?` from a `/metrics` route
//! # let _ = engine;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `sbar_updates_total{module, outcome}` - Counter
//! - `sbar_update_duration_seconds{module}` - Histogram
//! - `sbar_tasks_finished_total{module, reason}` - Counter
//! - `sbar_control_rejected_total{op}` - Counter
mod backend;
pub use backend::PrometheusMetrics;
