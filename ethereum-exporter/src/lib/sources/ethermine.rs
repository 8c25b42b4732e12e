//! Unpaid miner balances from the Ethermine pool API.

use serde::Deserialize;

use super::SourceClient;
use crate::error::SourceError;

const WEI_PER_ETH: f64 = 1e18;

// The currentStats endpoint answers with this payload while a miner has no
// active workers, even though the dashboard still knows its unpaid balance.
const NO_DATA_SENTINEL: &str = r#""data":"NO DATA""#;

#[derive(Debug, Deserialize)]
struct CurrentStatsResponse {
    status: String,
    error: Option<String>,
    data: Option<CurrentStats>,
}

#[derive(Debug, Deserialize)]
struct CurrentStats {
    unpaid: u64,
}

#[derive(Debug, Deserialize)]
struct DashboardResponse {
    status: String,
    error: Option<String>,
    data: Option<DashboardData>,
}

#[derive(Debug, Deserialize)]
struct DashboardData {
    #[serde(rename = "currentStatistics")]
    current_statistics: CurrentStats,
}

/// Unpaid pool balance of a miner address in ETH.
pub async fn fetch_pool_balance(
    client: &SourceClient,
    base_url: &str,
    address: &str,
) -> Result<f64, SourceError> {
    let url = format!("{base_url}/miner/{address}/currentStats");
    let body = client.get_text(&url).await?;
    if body.contains(NO_DATA_SENTINEL) {
        return fetch_dashboard_balance(client, base_url, address).await;
    }
    parse_current_stats(&url, &body)
}

async fn fetch_dashboard_balance(
    client: &SourceClient,
    base_url: &str,
    address: &str,
) -> Result<f64, SourceError> {
    let url = format!("{base_url}/miner/{address}/dashboard");
    let body = client.get_text(&url).await?;
    parse_dashboard(&url, &body)
}

fn parse_current_stats(url: &str, body: &str) -> Result<f64, SourceError> {
    let response: CurrentStatsResponse =
        serde_json::from_str(body).map_err(|e| SourceError::decode(url, e))?;
    if response.status != "OK" {
        return Err(SourceError::upstream(url, response.error.unwrap_or_default()));
    }
    let stats = response
        .data
        .ok_or_else(|| SourceError::decode(url, "missing data object"))?;
    Ok(stats.unpaid as f64 / WEI_PER_ETH)
}

fn parse_dashboard(url: &str, body: &str) -> Result<f64, SourceError> {
    let response: DashboardResponse =
        serde_json::from_str(body).map_err(|e| SourceError::decode(url, e))?;
    if response.status != "OK" {
        return Err(SourceError::upstream(url, response.error.unwrap_or_default()));
    }
    let data = response
        .data
        .ok_or_else(|| SourceError::decode(url, "missing data object"))?;
    Ok(data.current_statistics.unpaid as f64 / WEI_PER_ETH)
}
