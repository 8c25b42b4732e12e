//! Prometheus metric families built from a cached snapshot.
//!
//! Every scrape builds a fresh [`PrometheusMetrics`] with its own registry
//! and fills it from exactly one snapshot. Concurrent scrapes never share
//! gauge state, and balance label sets from addresses that were removed from
//! the configuration cannot linger across scrapes.

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use super::snapshot_cache::InfoSnapshot;

/// One registry worth of Ethereum metric families.
///
/// Comes in two variants: the global one for the public endpoint, and one
/// that additionally carries the per-address balance family.
pub struct PrometheusMetrics {
    registry: Registry,
    block_time_seconds: Gauge,
    block_reward: GaugeVec,
    last_block_number: Gauge,
    difficulty: GaugeVec,
    network_hashrate: Gauge,
    usd_price: Gauge,
    snapshot_age_seconds: Gauge,
    balance_eth: Option<GaugeVec>,
}

impl PrometheusMetrics {
    /// Build the metric families and register them on a fresh registry.
    ///
    /// The balance family only exists when `include_balances` is set, so the
    /// global endpoint cannot leak monitored addresses.
    pub fn new(include_balances: bool) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let block_time_seconds = Gauge::with_opts(Opts::new(
            "ethereum_block_time_seconds",
            "Average time between blocks in seconds",
        ))?;
        registry.register(Box::new(block_time_seconds.clone()))?;

        let block_reward = GaugeVec::new(
            Opts::new(
                "ethereum_block_reward",
                "Block reward in ETH per reporting window",
            ),
            &["window"],
        )?;
        registry.register(Box::new(block_reward.clone()))?;

        let last_block_number = Gauge::with_opts(Opts::new(
            "ethereum_last_block_number",
            "Number of the most recently mined block",
        ))?;
        registry.register(Box::new(last_block_number.clone()))?;

        let difficulty = GaugeVec::new(
            Opts::new(
                "ethereum_difficulty",
                "Network difficulty per reporting window",
            ),
            &["window"],
        )?;
        registry.register(Box::new(difficulty.clone()))?;

        let network_hashrate = Gauge::with_opts(Opts::new(
            "ethereum_network_hashrate",
            "Estimated network hashrate in hashes per second",
        ))?;
        registry.register(Box::new(network_hashrate.clone()))?;

        let usd_price = Gauge::with_opts(Opts::new(
            "ethereum_usd_price",
            "Current ETH price in USD",
        ))?;
        registry.register(Box::new(usd_price.clone()))?;

        let snapshot_age_seconds = Gauge::with_opts(Opts::new(
            "ethereum_exporter_snapshot_age_seconds",
            "Seconds since the served snapshot was gathered",
        ))?;
        registry.register(Box::new(snapshot_age_seconds.clone()))?;

        let balance_eth = if include_balances {
            let balance_eth = GaugeVec::new(
                Opts::new(
                    "ethereum_balance_eth",
                    "Balance in ETH per monitored address and location",
                ),
                &["address", "location"],
            )?;
            registry.register(Box::new(balance_eth.clone()))?;
            Some(balance_eth)
        } else {
            None
        };

        Ok(Self {
            registry,
            block_time_seconds,
            block_reward,
            last_block_number,
            difficulty,
            network_hashrate,
            usd_price,
            snapshot_age_seconds,
            balance_eth,
        })
    }

    /// Set every family from one snapshot.
    pub fn fill(&self, snapshot: &InfoSnapshot) {
        let info = &snapshot.info;
        self.block_time_seconds.set(info.block_time_secs);
        self.block_reward
            .with_label_values(&["current"])
            .set(info.block_reward);
        self.block_reward
            .with_label_values(&["24h"])
            .set(info.block_reward_24h);
        self.block_reward
            .with_label_values(&["3d"])
            .set(info.block_reward_3d);
        self.block_reward
            .with_label_values(&["7d"])
            .set(info.block_reward_7d);
        self.last_block_number.set(info.last_block as f64);
        self.difficulty
            .with_label_values(&["current"])
            .set(info.difficulty);
        self.difficulty
            .with_label_values(&["24h"])
            .set(info.difficulty_24h);
        self.difficulty
            .with_label_values(&["3d"])
            .set(info.difficulty_3d);
        self.difficulty
            .with_label_values(&["7d"])
            .set(info.difficulty_7d);
        self.network_hashrate.set(info.network_hashrate);
        self.usd_price.set(info.usd_price);
        let age = snapshot.age().map(|a| a.as_secs_f64()).unwrap_or(0.0);
        self.snapshot_age_seconds.set(age);
        if let Some(ref balance_eth) = self.balance_eth {
            for balance in &info.balances {
                balance_eth
                    .with_label_values(&[balance.address.as_str(), balance.location.as_str()])
                    .set(balance.amount);
            }
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{Balance, BalanceLocation, EthereumInfo, NetworkStats};
    use std::{sync::Arc, time::Instant};

    fn sample_snapshot() -> InfoSnapshot {
        let network = NetworkStats {
            block_time_secs: 13.5,
            block_reward: 2.0,
            block_reward_24h: 2.1,
            block_reward_3d: 2.2,
            block_reward_7d: 2.3,
            last_block: 12_345_678,
            difficulty: 1e15,
            difficulty_24h: 2e15,
            difficulty_3d: 3e15,
            difficulty_7d: 4e15,
            network_hashrate: 5e14,
        };
        let balances = vec![
            Balance {
                address: "0xabc".to_string(),
                location: BalanceLocation::Wallet,
                amount: 1.5,
            },
            Balance {
                address: "0xabc".to_string(),
                location: BalanceLocation::Ethermine,
                amount: 0.25,
            },
        ];
        InfoSnapshot {
            timestamp: Some(Instant::now()),
            info: Arc::new(EthereumInfo::from_parts(network, 1234.56, balances)),
        }
    }

    #[test]
    fn fill_covers_every_family() {
        let metrics = PrometheusMetrics::new(false).unwrap();
        metrics.fill(&sample_snapshot());
        let text = metrics.encode().unwrap();

        assert!(text.contains("ethereum_block_time_seconds 13.5"));
        assert!(text.contains(r#"ethereum_block_reward{window="24h"} 2.1"#));
        assert!(text.contains(r#"ethereum_block_reward{window="7d"} 2.3"#));
        assert!(text.contains("ethereum_last_block_number 12345678"));
        assert!(text.contains(r#"ethereum_difficulty{window="current"} 1000000000000000"#));
        assert!(text.contains(r#"ethereum_difficulty{window="7d"} 4000000000000000"#));
        assert!(text.contains("ethereum_network_hashrate 500000000000000"));
        assert!(text.contains("ethereum_usd_price 1234.56"));
        assert!(text.contains("ethereum_exporter_snapshot_age_seconds"));
    }

    #[test]
    fn global_variant_never_emits_balances() {
        let metrics = PrometheusMetrics::new(false).unwrap();
        // The snapshot carries balances, the global families must not.
        metrics.fill(&sample_snapshot());
        let text = metrics.encode().unwrap();

        assert!(text.contains("ethereum_usd_price 1234.56"));
        assert!(!text.contains("ethereum_balance_eth"));
    }

    #[test]
    fn balance_variant_emits_labeled_samples() {
        let metrics = PrometheusMetrics::new(true).unwrap();
        metrics.fill(&sample_snapshot());
        let text = metrics.encode().unwrap();

        assert!(text.contains(r#"ethereum_balance_eth{address="0xabc",location="wallet"} 1.5"#));
        assert!(
            text.contains(r#"ethereum_balance_eth{address="0xabc",location="ethermine-org"} 0.25"#)
        );
    }

    #[test]
    fn uninitialized_snapshot_encodes_zeroes() {
        let metrics = PrometheusMetrics::new(true).unwrap();
        metrics.fill(&InfoSnapshot::default());
        let text = metrics.encode().unwrap();

        assert!(text.contains("ethereum_usd_price 0"));
        assert!(text.contains("ethereum_exporter_snapshot_age_seconds 0"));
        assert!(!text.contains("ethereum_balance_eth{"));
    }
}
