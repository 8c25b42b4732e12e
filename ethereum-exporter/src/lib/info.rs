//! Snapshot data model: everything one gather cycle produces.

use serde::Serialize;

/// Where a balance was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceLocation {
    /// On-chain wallet balance, via the Etherscan account API.
    #[serde(rename = "wallet")]
    Wallet,
    /// Unpaid balance on the Ethermine pool.
    #[serde(rename = "ethermine-org")]
    Ethermine,
    /// Unpaid balance on the 2miners pool.
    #[serde(rename = "2miners-com")]
    TwoMiners,
}

impl BalanceLocation {
    /// Label value used on the balance metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceLocation::Wallet => "wallet",
            BalanceLocation::Ethermine => "ethermine-org",
            BalanceLocation::TwoMiners => "2miners-com",
        }
    }
}

impl std::fmt::Display for BalanceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed balance for a monitored address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub address: String,
    pub location: BalanceLocation,
    /// ETH, already normalized from the source's native unit.
    pub amount: f64,
}

/// Network-wide chain statistics, one value per reporting window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStats {
    pub block_time_secs: f64,
    pub block_reward: f64,
    pub block_reward_24h: f64,
    pub block_reward_3d: f64,
    pub block_reward_7d: f64,
    pub last_block: u64,
    pub difficulty: f64,
    pub difficulty_24h: f64,
    pub difficulty_3d: f64,
    pub difficulty_7d: f64,
    /// Hashes per second.
    pub network_hashrate: f64,
}

/// One fully gathered snapshot.
///
/// Published snapshots are immutable: the refresh side builds a complete
/// value and hands it over, consumers only ever read. Balances keep the
/// gather order: addresses as configured, wallet before pools within an
/// address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EthereumInfo {
    pub block_time_secs: f64,
    pub block_reward: f64,
    pub block_reward_24h: f64,
    pub block_reward_3d: f64,
    pub block_reward_7d: f64,
    pub last_block: u64,
    pub difficulty: f64,
    pub difficulty_24h: f64,
    pub difficulty_3d: f64,
    pub difficulty_7d: f64,
    pub network_hashrate: f64,
    pub usd_price: f64,
    pub balances: Vec<Balance>,
}

impl EthereumInfo {
    /// Assembles a snapshot from the per-source results.
    pub fn from_parts(network: NetworkStats, usd_price: f64, balances: Vec<Balance>) -> Self {
        Self {
            block_time_secs: network.block_time_secs,
            block_reward: network.block_reward,
            block_reward_24h: network.block_reward_24h,
            block_reward_3d: network.block_reward_3d,
            block_reward_7d: network.block_reward_7d,
            last_block: network.last_block,
            difficulty: network.difficulty,
            difficulty_24h: network.difficulty_24h,
            difficulty_3d: network.difficulty_3d,
            difficulty_7d: network.difficulty_7d,
            network_hashrate: network.network_hashrate,
            usd_price,
            balances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_label_values() {
        assert_eq!(BalanceLocation::Wallet.as_str(), "wallet");
        assert_eq!(BalanceLocation::Ethermine.as_str(), "ethermine-org");
        assert_eq!(BalanceLocation::TwoMiners.as_str(), "2miners-com");
    }

    #[test]
    fn balance_serializes_with_location_labels() {
        let balance = Balance {
            address: "0xabc".to_string(),
            location: BalanceLocation::TwoMiners,
            amount: 1.5,
        };
        let serialized = serde_json::to_string(&balance).unwrap();
        assert!(serialized.contains(r#""location":"2miners-com""#));
    }

    #[test]
    fn from_parts_keeps_every_field() {
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
        let balances = vec![Balance {
            address: "0xabc".to_string(),
            location: BalanceLocation::Wallet,
            amount: 0.25,
        }];

        let info = EthereumInfo::from_parts(network.clone(), 1234.56, balances.clone());

        assert_eq!(info.block_time_secs, network.block_time_secs);
        assert_eq!(info.block_reward, network.block_reward);
        assert_eq!(info.block_reward_24h, network.block_reward_24h);
        assert_eq!(info.block_reward_3d, network.block_reward_3d);
        assert_eq!(info.block_reward_7d, network.block_reward_7d);
        assert_eq!(info.last_block, network.last_block);
        assert_eq!(info.difficulty, network.difficulty);
        assert_eq!(info.difficulty_24h, network.difficulty_24h);
        assert_eq!(info.difficulty_3d, network.difficulty_3d);
        assert_eq!(info.difficulty_7d, network.difficulty_7d);
        assert_eq!(info.network_hashrate, network.network_hashrate);
        assert_eq!(info.usd_price, 1234.56);
        assert_eq!(info.balances, balances);
    }
}
