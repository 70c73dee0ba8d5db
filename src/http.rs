//! Prometheus scrape endpoint.
//!
//! The listener is bound by the caller during startup so a bad or taken port
//! fails the process instead of silently disabling metrics.

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tracing::info;

/// Router exposing `GET /metrics` in the Prometheus text format.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(|| async { crate::metrics::gather_metrics() }))
}

/// Serve the metrics router on an already bound listener.
pub async fn serve_metrics(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Metrics endpoint listening");
    }
    axum::serve(listener, metrics_router()).await
}
