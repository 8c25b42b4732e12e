//! Shared helpers for the exporter integration tests.

use std::{
    net::{SocketAddr, TcpListener},
    sync::Once,
    time::Duration,
};

use ethereum_exporter::{
    config::{ExporterConfig, SourceEndpoints, SourcesConfig},
    EthereumExporter,
};
use tracing::info;

pub mod mock_upstreams;

static LOGGING: Once = Once::new();

/// Initialize tracing once per test binary.
pub fn start_tracing() {
    LOGGING.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    });
}

/// Reserve an ephemeral local address for a metrics server.
pub fn get_available_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local address")
}

/// Exporter configuration pointing every source at the same base URL.
pub fn exporter_config(
    listen_address: SocketAddr,
    base_url: &str,
    update_interval_secs: u64,
    monitor_addresses: Vec<String>,
) -> ExporterConfig {
    let sources = SourcesConfig::new(
        true,
        true,
        true,
        Some("test-api-key".to_string()),
        SourceEndpoints::all_at(base_url),
    );
    ExporterConfig::new(
        listen_address,
        update_interval_secs,
        monitor_addresses,
        sources,
    )
}

/// Start an exporter in the background and wait until its metrics server
/// accepts connections.
pub async fn start_exporter(config: ExporterConfig) -> SocketAddr {
    let listen_address = config.listen_address();
    let exporter = EthereumExporter::new(config);
    tokio::spawn(async move {
        if let Err(e) = exporter.start().await {
            panic!("exporter failed to start: {e}");
        }
    });
    wait_for_http(listen_address).await;
    info!("Exporter listening on {listen_address}");
    listen_address
}

/// Poll until the metrics server accepts connections.
pub async fn wait_for_http(address: SocketAddr) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(address).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("metrics server at {address} never came up");
}

/// Fetch one path from the metrics server and return the response body.
pub async fn scrape(address: SocketAddr, path: &str) -> String {
    let url = format!("http://{address}{path}");
    let response = reqwest::get(&url).await.expect("scrape request");
    assert!(
        response.status().is_success(),
        "scrape of {url} failed with {}",
        response.status()
    );
    response.text().await.expect("scrape body")
}
