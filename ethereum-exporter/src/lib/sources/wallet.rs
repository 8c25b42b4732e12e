//! Wallet balances from the Etherscan API.

use serde::Deserialize;

use super::SourceClient;
use crate::error::SourceError;

const WEI_PER_ETH: f64 = 1e18;

#[derive(Debug, Deserialize)]
struct AccountBalanceResponse {
    status: String,
    // Holds the balance in wei on success and an error description otherwise.
    result: String,
}

/// Balance of a wallet address in ETH.
pub async fn fetch_wallet_balance(
    client: &SourceClient,
    base_url: &str,
    api_key: &str,
    address: &str,
) -> Result<f64, SourceError> {
    let url = format!(
        "{base_url}/api?module=account&action=balance&address={address}&tag=latest&apikey={api_key}"
    );
    let body = client.get_text(&url).await?;
    parse_wallet_balance(&url, &body)
}

fn parse_wallet_balance(url: &str, body: &str) -> Result<f64, SourceError> {
    let response: AccountBalanceResponse =
        serde_json::from_str(body).map_err(|e| SourceError::decode(url, e))?;
    if response.status != "1" {
        return Err(SourceError::upstream(url, response.result));
    }
    let wei = response
        .result
        .parse::<f64>()
        .map_err(|e| SourceError::decode(url, format!("balance {:?}: {e}", response.result)))?;
    Ok(wei / WEI_PER_ETH)
}
