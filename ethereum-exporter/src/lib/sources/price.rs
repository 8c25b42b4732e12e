//! ETH/USD price from the CryptoCompare API.

use serde::Deserialize;

use super::SourceClient;
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(rename = "USD")]
    usd: f64,
}

/// Current ETH price in USD.
pub async fn fetch_usd_price(
    client: &SourceClient,
    base_url: &str,
) -> Result<f64, SourceError> {
    let url = format!("{base_url}/data/price?fsym=ETH&tsyms=USD");
    let body = client.get_text(&url).await?;
    parse_price(&url, &body)
}

fn parse_price(url: &str, body: &str) -> Result<f64, SourceError> {
    let response: PriceResponse =
        serde_json::from_str(body).map_err(|e| SourceError::decode(url, e))?;
    Ok(response.usd)
}
