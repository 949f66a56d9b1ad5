mod config;
mod http;
mod monitors;
mod sink;

use std::sync::Arc;

use time::UtcOffset;
use tracing::info;

use sbar_core::prelude::*;
use sbar_observe::init_logger;
use sbar_prometheus::PrometheusMetrics;

use crate::config::AgentConfig;
use crate::monitors::{Clock, LoadAvg};

fn main() -> anyhow::Result<()> {
    let cfg = AgentConfig::load()?;

    // 1) logger and local offset, both before any other thread exists
    init_logger(&cfg.logger)?;
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    info!("logger initialized");

    // 2) runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(cfg, offset))
}

async fn run(cfg: AgentConfig, offset: UtcOffset) -> anyhow::Result<()> {
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let display = cfg.display.display_config()?;

    // 3) engine + monitors
    let mut builder = Engine::builder(cfg.engine.clone())
        .with_sink(cfg.display.sink.build())
        .with_metrics(metrics.clone())
        .with_signal_handler(true);
    builder.register(LoadAvg::new(display.clone()), cfg.modules.load_secs)?;
    builder.register(Clock::new(display, offset), cfg.modules.clock_secs)?;
    let engine = Arc::new(builder.build()?);

    // 4) rest api + /metrics
    let server = if cfg.api.enabled {
        let listener = tokio::net::TcpListener::bind(cfg.api.listen).await?;
        info!(listen = %cfg.api.listen, "rest api listening");
        Some(tokio::spawn(http::serve(
            listener,
            Arc::clone(&engine),
            Arc::clone(&metrics),
        )))
    } else {
        None
    };

    // 5) run until a signal, a DELETE or every task is done
    let result = engine.run().await;
    if let Some(server) = server {
        server.await??;
    }
    result?;

    info!(uptime = engine.uptime(), "agent stopped");
    Ok(())
}
