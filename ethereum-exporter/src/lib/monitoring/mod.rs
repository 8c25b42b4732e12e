//! Monitoring side of the exporter.
//!
//! Serves the most recent gather result to Prometheus scrapes.
//! Read-only - never triggers upstream requests.
//!
//! ## Architecture
//!
//! - **SnapshotCache**: holds the latest successful gather result
//! - **PrometheusMetrics**: one registry worth of metric families, built per scrape
//! - **MonitoringServer**: Axum server exposing `/`, `/metrics` and `/metrics/balances`

pub mod http_server;
pub mod prometheus_metrics;
pub mod snapshot_cache;

pub use http_server::MonitoringServer;
pub use prometheus_metrics::PrometheusMetrics;
pub use snapshot_cache::{InfoSnapshot, SnapshotCache};
