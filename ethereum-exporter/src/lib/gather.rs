//! Assembles a complete [`EthereumInfo`] from the individual source fetchers.
//!
//! Network statistics and the USD price are required for a gather cycle to
//! succeed. Balance sources are optional per address: a failing source is
//! logged and skipped so one flaky pool API cannot block the whole cycle.

use tracing::warn;

use crate::{
    config::SourcesConfig,
    error::SourceError,
    info::{Balance, BalanceLocation, EthereumInfo, NetworkStats},
    sources::{self, SourceClient},
};

/// Balances of one address across the configured sources.
///
/// Sources are queried in a fixed order (wallet, then ethermine, then
/// 2miners) so repeated cycles report balances in a stable order. Each
/// source contributes at most one entry.
pub async fn account_balances(
    client: &SourceClient,
    sources_config: &SourcesConfig,
    address: &str,
) -> Vec<Balance> {
    let mut balances = Vec::new();
    if let Some(api_key) = sources_config.etherscan_api_key() {
        let base_url = sources_config.endpoints().etherscan();
        match sources::wallet::fetch_wallet_balance(client, base_url, api_key, address).await {
            Ok(amount) => balances.push(Balance {
                address: address.to_string(),
                location: BalanceLocation::Wallet,
                amount,
            }),
            Err(e) => warn!("Skipping wallet balance for {address}: {e}"),
        }
    }
    if sources_config.ethermine() {
        let base_url = sources_config.endpoints().ethermine();
        match sources::ethermine::fetch_pool_balance(client, base_url, address).await {
            Ok(amount) => balances.push(Balance {
                address: address.to_string(),
                location: BalanceLocation::Ethermine,
                amount,
            }),
            Err(e) => warn!("Skipping ethermine balance for {address}: {e}"),
        }
    }
    if sources_config.two_miners() {
        let base_url = sources_config.endpoints().two_miners();
        match sources::two_miners::fetch_pool_balance(client, base_url, address).await {
            Ok(amount) => balances.push(Balance {
                address: address.to_string(),
                location: BalanceLocation::TwoMiners,
                amount,
            }),
            Err(e) => warn!("Skipping 2miners balance for {address}: {e}"),
        }
    }
    balances
}

/// One full gather cycle over every configured source and address.
///
/// Fails if network statistics or the price cannot be fetched. Balance
/// failures only reduce the balance list, never the whole result.
pub async fn gather_info(
    client: &SourceClient,
    sources_config: &SourcesConfig,
    addresses: &[String],
) -> Result<EthereumInfo, SourceError> {
    let network = if sources_config.network_stats() {
        sources::network::fetch_network_stats(client, sources_config.endpoints().whattomine())
            .await?
    } else {
        NetworkStats::default()
    };
    let usd_price =
        sources::price::fetch_usd_price(client, sources_config.endpoints().cryptocompare()).await?;
    let mut balances = Vec::new();
    for address in addresses {
        balances.extend(account_balances(client, sources_config, address).await);
    }
    Ok(EthereumInfo::from_parts(network, usd_price, balances))
}
