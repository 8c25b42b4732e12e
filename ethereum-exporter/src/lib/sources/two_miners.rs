//! Unpaid miner balances from the 2miners pool API.

use serde::Deserialize;

use super::SourceClient;
use crate::error::SourceError;

// 2miners reports balances in Gwei rather than wei.
const GWEI_PER_ETH: f64 = 1e9;

#[derive(Debug, Deserialize)]
struct AccountResponse {
    stats: AccountStats,
}

#[derive(Debug, Deserialize)]
struct AccountStats {
    balance: u64,
}

/// Unpaid pool balance of a miner address in ETH.
pub async fn fetch_pool_balance(
    client: &SourceClient,
    base_url: &str,
    address: &str,
) -> Result<f64, SourceError> {
    let url = format!("{base_url}/api/accounts/{address}");
    let body = client.get_text(&url).await?;
    parse_account(&url, &body)
}

fn parse_account(url: &str, body: &str) -> Result<f64, SourceError> {
    let response: AccountResponse =
        serde_json::from_str(body).map_err(|e| SourceError::decode(url, e))?;
    Ok(response.stats.balance as f64 / GWEI_PER_ETH)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://eth.2miners.com/api/accounts/0xabc";

    #[test]
    fn parses_gwei_into_eth() {
        let body = r#"{"currentHashrate":0,"stats":{"balance":1500000000,"paid":0}}"#;
        assert_eq!(parse_account(URL, body).unwrap(), 1.5);
    }

    #[test]
    fn unknown_address_body_is_a_decode_error() {
        let err = parse_account(URL, r#"{"error":"no such address"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }
}
