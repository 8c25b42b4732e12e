//! HTTP server exposing the cached snapshot to Prometheus scrapes using Axum

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use super::{prometheus_metrics::PrometheusMetrics, snapshot_cache::SnapshotCache};

const INDEX_PAGE: &str = r#"<html>
<head><title>Ethereum Exporter</title></head>
<body>
<h1>Ethereum Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/metrics/balances">Metrics including per-address balances</a></p>
</body>
</html>
"#;

/// Shared state for all HTTP handlers
#[derive(Clone)]
struct ServerState {
    cache: Arc<SnapshotCache>,
}

/// HTTP server that serves the latest snapshot in Prometheus text format.
///
/// Handlers only read the snapshot cache. Scrapes never trigger upstream
/// requests, so any number of concurrent scrapers is safe.
pub struct MonitoringServer {
    bind_address: SocketAddr,
    state: ServerState,
}

impl MonitoringServer {
    /// Create a new metrics server reading from the given cache.
    pub fn new(bind_address: SocketAddr, cache: Arc<SnapshotCache>) -> Self {
        Self {
            bind_address,
            state: ServerState { cache },
        }
    }

    /// Run the metrics server until the shutdown signal completes.
    ///
    /// Exposes:
    /// - an index page at `/`
    /// - global metrics (no balances) at `/metrics`
    /// - global metrics plus per-address balances at `/metrics/balances`
    pub async fn run(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Starting metrics server on http://{}", self.bind_address);

        let app = Router::new()
            .route("/", get(handle_index))
            .route("/metrics", get(handle_global_metrics))
            .route("/metrics/balances", get(handle_balance_metrics))
            .with_state(self.state);

        let listener = TcpListener::bind(self.bind_address).await?;

        info!(
            "Prometheus metrics available at http://{}/metrics",
            self.bind_address
        );

        let server_handle = axum::serve(listener, app).with_graceful_shutdown(async move {
            shutdown_signal.await;
            info!("Metrics server received shutdown signal, stopping...");
        });

        let result = server_handle.await;

        info!("Metrics server stopped");
        result.map_err(|e| e.into())
    }
}

/// Landing page linking to both metrics endpoints
async fn handle_index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Global metrics, safe to expose publicly
async fn handle_global_metrics(State(state): State<ServerState>) -> Response {
    render_metrics(&state, false)
}

/// Global metrics plus the per-address balance family
async fn handle_balance_metrics(State(state): State<ServerState>) -> Response {
    render_metrics(&state, true)
}

/// Build a fresh registry, fill it from one snapshot read and encode it.
fn render_metrics(state: &ServerState, include_balances: bool) -> Response {
    let snapshot = state.cache.get_snapshot();

    let metrics = match PrometheusMetrics::new(include_balances) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to build metric families: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response();
        }
    };
    metrics.fill(&snapshot);

    match metrics.encode() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response()
        }
    }
}
