//! HTTP endpoint for Prometheus scraping.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use tracing::{error, info};

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Router serving `GET /metrics`.
pub fn router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve `/metrics` on `0.0.0.0:port` until the process exits.
pub async fn run_http_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind metrics endpoint");
            return;
        }
    };
    info!(%addr, "Metrics endpoint listening");

    if let Err(e) = axum::serve(listener, router()).await {
        error!(error = %e, "Metrics endpoint failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_handler_renders_registry() {
        crate::metrics::init();
        crate::metrics::record_connection();
        let body = metrics_handler().await;
        assert!(body.contains("parlor_connections_accepted_total"));
    }
}
