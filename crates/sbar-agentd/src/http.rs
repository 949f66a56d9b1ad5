//! REST routes of the engine plus the prometheus scrape endpoint.
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tracing::warn;

use sbar_api::{EngineApiAdapter, HttpApi};
use sbar_core::prelude::Engine;
use sbar_prometheus::PrometheusMetrics;

/// Full daemon router: `/ping`, `/rest/v1/...` and `GET /metrics`.
pub fn router(engine: &Engine, metrics: Arc<PrometheusMetrics>) -> Router {
    let adapter = Arc::new(EngineApiAdapter::new(engine.control()));
    HttpApi::new(adapter).router().merge(metrics_router(metrics))
}

fn metrics_router(metrics: Arc<PrometheusMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<Arc<PrometheusMetrics>>) -> Response {
    match metrics.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            warn!(error = %e, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve until the engine reaches `Stopped`.
pub async fn serve(
    listener: TcpListener,
    engine: Arc<Engine>,
    metrics: Arc<PrometheusMetrics>,
) -> std::io::Result<()> {
    let app = router(&engine, metrics);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { engine.wait_stopped().await })
        .await
}
