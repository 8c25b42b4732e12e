//! ## Ethereum Exporter
//!
//! Provides the core logic and main struct ([`EthereumExporter`]) for running
//! a Prometheus exporter for Ethereum network statistics, the ETH/USD price
//! and wallet or mining pool balances of monitored addresses.
//!
//! The central component is the [`EthereumExporter`] struct, which
//! encapsulates the configuration and provides the `start` method as the main
//! entry point for running the exporter. It relies on several sub-modules
//! (`config`, `sources`, `gather`, `monitoring`) for specialized
//! functionality.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    config::ExporterConfig,
    error::ExporterErrorKind,
    monitoring::{MonitoringServer, SnapshotCache},
    sources::SourceClient,
    status::{State, Status},
    utils::{ShutdownMessage, SHUTDOWN_BROADCAST_CAPACITY},
};

pub mod config;
pub mod error;
pub mod gather;
pub mod info;
pub mod monitoring;
pub mod sources;
mod status;
pub mod utils;

/// The main struct that manages the exporter.
#[derive(Clone)]
pub struct EthereumExporter {
    config: ExporterConfig,
    notify_shutdown: broadcast::Sender<ShutdownMessage>,
}

#[cfg_attr(not(test), hotpath::measure_all)]
impl EthereumExporter {
    /// Creates a new [`EthereumExporter`] instance.
    pub fn new(config: ExporterConfig) -> Self {
        let (notify_shutdown, _) =
            tokio::sync::broadcast::channel::<ShutdownMessage>(SHUTDOWN_BROADCAST_CAPACITY);
        Self {
            config,
            notify_shutdown,
        }
    }

    /// Starts the exporter main loop.
    ///
    /// Runs one verbose gather cycle up front and refuses to start when it
    /// fails. Afterwards a background task refreshes the snapshot at the
    /// configured interval while the metrics server serves scrapes from the
    /// cache.
    pub async fn start(&self) -> Result<(), ExporterErrorKind> {
        info!(
            "Starting Ethereum exporter, monitoring {} address(es)",
            self.config.monitor_addresses().len()
        );

        let notify_shutdown = self.notify_shutdown.clone();

        let client = SourceClient::new()
            .map_err(|e| ExporterErrorKind::Startup(format!("HTTP client setup failed: {e}")))?;

        // A failing first cycle means the configuration or the upstreams are
        // broken. Refusing to start beats serving zeroes.
        let initial = gather::gather_info(
            &client.verbose(),
            self.config.sources(),
            self.config.monitor_addresses(),
        )
        .await?;
        match serde_json::to_string(&initial) {
            Ok(serialized) => info!("Read initial Ethereum info: {serialized}"),
            Err(e) => warn!("Could not serialize initial Ethereum info: {e}"),
        }

        let cache = Arc::new(SnapshotCache::new());
        cache.update(initial);

        let (status_sender, status_receiver) = async_channel::unbounded::<Status>();

        let refresh_cache = cache.clone();
        let refresh_client = client.clone();
        let refresh_sources = self.config.sources().clone();
        let refresh_addresses = self.config.monitor_addresses().to_vec();
        let update_interval = self.config.update_interval();
        let mut refresh_shutdown = notify_shutdown.subscribe();
        let refresh_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(update_interval);
            // The first tick fires immediately and the initial gather already ran.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match gather::gather_info(
                            &refresh_client,
                            &refresh_sources,
                            &refresh_addresses,
                        )
                        .await
                        {
                            Ok(latest) => refresh_cache.update(latest),
                            Err(e) => warn!("Gather cycle failed, keeping previous snapshot: {e}"),
                        }
                    }
                    _ = refresh_shutdown.recv() => break,
                }
            }
        });

        let monitoring_server = MonitoringServer::new(self.config.listen_address(), cache.clone());

        // Resolves once ShutdownAll is broadcast or the channel closes.
        let mut notify_shutdown_monitoring = notify_shutdown.subscribe();
        let shutdown_signal = async move {
            let _ = notify_shutdown_monitoring.recv().await;
        };

        let server_handle = tokio::spawn(async move {
            if let Err(e) = monitoring_server.run(shutdown_signal).await {
                let _ = status_sender
                    .send(Status {
                        state: State::MonitoringShutdown(e.to_string()),
                    })
                    .await;
            }
        });

        let mut failure = None;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl+C received, initiating graceful shutdown...");
                    let _ = notify_shutdown.send(ShutdownMessage::ShutdownAll);
                    break;
                }
                message = status_receiver.recv() => {
                    if let Ok(status) = message {
                        match status.state {
                            State::MonitoringShutdown(reason) => {
                                warn!("Metrics server stopped: {reason}");
                                let _ = notify_shutdown.send(ShutdownMessage::ShutdownAll);
                                failure = Some(ExporterErrorKind::Monitoring(reason));
                                break;
                            }
                        }
                    }
                }
            }
        }

        refresh_handle.abort();
        let _ = server_handle.await;
        info!("Ethereum exporter shutdown complete.");
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for EthereumExporter {
    fn drop(&mut self) {
        info!("EthereumExporter dropped");
        let _ = self.notify_shutdown.send(ShutdownMessage::ShutdownAll);
    }
}
