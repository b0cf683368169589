//! Prometheus metrics & middleware helper.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::IntCounter;

/// Entry rows written by the bulk reconciler.
pub static ENTRIES_UPSERTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("league_entries_upserted_total", "Game entries upserted")
        .expect("static counter opts")
});

/// Games moved from OPEN to CLOSED.
pub static GAMES_CLOSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("league_games_closed_total", "Games closed").expect("static counter opts")
});

/// Build the request middleware (exposed at `/metrics`) and register the
/// league counters on its registry.
pub fn init() -> anyhow::Result<PrometheusMetrics> {
    let prom = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("metrics builder: {e}"))?;

    prom.registry.register(Box::new(ENTRIES_UPSERTED.clone()))?;
    prom.registry.register(Box::new(GAMES_CLOSED.clone()))?;
    Ok(prom)
}
