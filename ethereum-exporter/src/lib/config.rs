use serde::Deserialize;
use std::{net::SocketAddr, time::Duration};

use crate::error::ExporterErrorKind;

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8577))
}

fn default_update_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_whattomine_url() -> String {
    "https://whattomine.com".to_string()
}

fn default_cryptocompare_url() -> String {
    "https://min-api.cryptocompare.com".to_string()
}

fn default_etherscan_url() -> String {
    "https://api.etherscan.io".to_string()
}

fn default_ethermine_url() -> String {
    "https://api.ethermine.org".to_string()
}

fn default_two_miners_url() -> String {
    "https://eth.2miners.com".to_string()
}

/// Exporter configuration, loaded from a TOML file.
#[derive(Debug, Deserialize, Clone)]
pub struct ExporterConfig {
    /// The address the metrics HTTP server binds to.
    #[serde(default = "default_listen_address")]
    listen_address: SocketAddr,
    /// Seconds between two gather cycles.
    #[serde(default = "default_update_interval_secs")]
    update_interval_secs: u64,
    /// Ethereum addresses whose balances are monitored.
    #[serde(default)]
    monitor_addresses: Vec<String>,
    /// Upstream API toggles and endpoints.
    #[serde(default)]
    sources: SourcesConfig,
}

impl ExporterConfig {
    /// Creates a new [`ExporterConfig`] instance.
    pub fn new(
        listen_address: SocketAddr,
        update_interval_secs: u64,
        monitor_addresses: Vec<String>,
        sources: SourcesConfig,
    ) -> Self {
        Self {
            listen_address,
            update_interval_secs,
            monitor_addresses,
            sources,
        }
    }

    /// Rejects values that would make the exporter start in a broken state.
    pub fn validate(&self) -> Result<(), ExporterErrorKind> {
        if self.update_interval_secs == 0 {
            return Err(ExporterErrorKind::BadConfig(
                "update_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self
            .monitor_addresses
            .iter()
            .any(|address| address.trim().is_empty())
        {
            return Err(ExporterErrorKind::BadConfig(
                "monitor_addresses contains an empty entry".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the metrics server bind address.
    pub fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Returns the interval between two gather cycles.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Returns the monitored addresses in configured order.
    pub fn monitor_addresses(&self) -> &[String] {
        &self.monitor_addresses
    }

    /// Returns the upstream source configuration.
    pub fn sources(&self) -> &SourcesConfig {
        &self.sources
    }
}

/// Which upstream APIs are queried, and where they live.
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Gather block/difficulty/hashrate statistics from WhatToMine.
    #[serde(default = "default_true")]
    network_stats: bool,
    /// Monitor unpaid balances on the Ethermine pool.
    #[serde(default = "default_true")]
    ethermine: bool,
    /// Monitor unpaid balances on the 2miners pool.
    #[serde(default = "default_true")]
    two_miners: bool,
    /// Etherscan API key. Wallet balances are only fetched when set.
    #[serde(default)]
    etherscan_api_key: Option<String>,
    /// Base URLs, overridable for tests and self-hosted mirrors.
    #[serde(default)]
    endpoints: SourceEndpoints,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            network_stats: true,
            ethermine: true,
            two_miners: true,
            etherscan_api_key: None,
            endpoints: SourceEndpoints::default(),
        }
    }
}

impl SourcesConfig {
    /// Creates a new [`SourcesConfig`] instance.
    pub fn new(
        network_stats: bool,
        ethermine: bool,
        two_miners: bool,
        etherscan_api_key: Option<String>,
        endpoints: SourceEndpoints,
    ) -> Self {
        Self {
            network_stats,
            ethermine,
            two_miners,
            etherscan_api_key,
            endpoints,
        }
    }

    /// Whether WhatToMine network statistics are gathered.
    pub fn network_stats(&self) -> bool {
        self.network_stats
    }

    /// Whether Ethermine pool balances are gathered.
    pub fn ethermine(&self) -> bool {
        self.ethermine
    }

    /// Whether 2miners pool balances are gathered.
    pub fn two_miners(&self) -> bool {
        self.two_miners
    }

    /// Returns the Etherscan API key (if wallet monitoring is enabled).
    pub fn etherscan_api_key(&self) -> Option<&str> {
        self.etherscan_api_key.as_deref()
    }

    /// Returns the upstream base URLs.
    pub fn endpoints(&self) -> &SourceEndpoints {
        &self.endpoints
    }
}

/// Base URLs of the upstream APIs.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceEndpoints {
    #[serde(default = "default_whattomine_url")]
    whattomine: String,
    #[serde(default = "default_cryptocompare_url")]
    cryptocompare: String,
    #[serde(default = "default_etherscan_url")]
    etherscan: String,
    #[serde(default = "default_ethermine_url")]
    ethermine: String,
    #[serde(default = "default_two_miners_url")]
    two_miners: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            whattomine: default_whattomine_url(),
            cryptocompare: default_cryptocompare_url(),
            etherscan: default_etherscan_url(),
            ethermine: default_ethermine_url(),
            two_miners: default_two_miners_url(),
        }
    }
}

impl SourceEndpoints {
    /// Creates a new [`SourceEndpoints`] instance.
    pub fn new(
        whattomine: String,
        cryptocompare: String,
        etherscan: String,
        ethermine: String,
        two_miners: String,
    ) -> Self {
        Self {
            whattomine,
            cryptocompare,
            etherscan,
            ethermine,
            two_miners,
        }
    }

    /// Points every source at the same base URL.
    pub fn all_at(base_url: &str) -> Self {
        Self {
            whattomine: base_url.to_string(),
            cryptocompare: base_url.to_string(),
            etherscan: base_url.to_string(),
            ethermine: base_url.to_string(),
            two_miners: base_url.to_string(),
        }
    }

    pub fn whattomine(&self) -> &str {
        &self.whattomine
    }

    pub fn cryptocompare(&self) -> &str {
        &self.cryptocompare
    }

    pub fn etherscan(&self) -> &str {
        &self.etherscan
    }

    pub fn ethermine(&self) -> &str {
        &self.ethermine
    }

    pub fn two_miners(&self) -> &str {
        &self.two_miners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ext_config::{Config, File, FileFormat};

    fn parse(toml: &str) -> ExporterConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.listen_address(), "0.0.0.0:8577".parse().unwrap());
        assert_eq!(config.update_interval(), Duration::from_secs(60));
        assert!(config.monitor_addresses().is_empty());
        assert!(config.sources().network_stats());
        assert!(config.sources().ethermine());
        assert!(config.sources().two_miners());
        assert!(config.sources().etherscan_api_key().is_none());
        assert_eq!(
            config.sources().endpoints().cryptocompare(),
            "https://min-api.cryptocompare.com"
        );
    }

    #[test]
    fn full_config_round_trips() {
        let config = parse(
            r#"
            listen_address = "127.0.0.1:9000"
            update_interval_secs = 5
            monitor_addresses = ["0xabc", "0xdef"]

            [sources]
            network_stats = false
            ethermine = false
            two_miners = true
            etherscan_api_key = "KEY"

            [sources.endpoints]
            two_miners = "http://localhost:7777"
            "#,
        );
        assert_eq!(config.listen_address(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.update_interval(), Duration::from_secs(5));
        assert_eq!(config.monitor_addresses(), ["0xabc", "0xdef"]);
        assert!(!config.sources().network_stats());
        assert!(!config.sources().ethermine());
        assert!(config.sources().two_miners());
        assert_eq!(config.sources().etherscan_api_key(), Some("KEY"));
        // Overriding one endpoint leaves the others at their defaults.
        assert_eq!(
            config.sources().endpoints().two_miners(),
            "http://localhost:7777"
        );
        assert_eq!(
            config.sources().endpoints().ethermine(),
            "https://api.ethermine.org"
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = parse("update_interval_secs = 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_address_is_rejected() {
        let config = parse(r#"monitor_addresses = ["0xabc", "  "]"#);
        assert!(config.validate().is_err());
    }

    #[test]
    fn valid_config_passes_validation() {
        let config = parse(r#"monitor_addresses = ["0xabc"]"#);
        assert!(config.validate().is_ok());
    }
}
