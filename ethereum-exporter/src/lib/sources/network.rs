//! Network statistics from the WhatToMine API.

use serde::Deserialize;

use super::SourceClient;
use crate::{error::SourceError, info::NetworkStats};

#[derive(Debug, Deserialize)]
struct CoinResponse {
    // WhatToMine serializes the block time as a string, e.g. "13.2".
    block_time: String,
    block_reward: f64,
    #[serde(rename = "block_reward24")]
    block_reward_24h: f64,
    #[serde(rename = "block_reward3")]
    block_reward_3d: f64,
    #[serde(rename = "block_reward7")]
    block_reward_7d: f64,
    last_block: u64,
    difficulty: f64,
    #[serde(rename = "difficulty24")]
    difficulty_24h: f64,
    #[serde(rename = "difficulty3")]
    difficulty_3d: f64,
    #[serde(rename = "difficulty7")]
    difficulty_7d: f64,
    nethash: f64,
}

/// Block, difficulty and hashrate statistics for Ethereum (WhatToMine coin 151).
pub async fn fetch_network_stats(
    client: &SourceClient,
    base_url: &str,
) -> Result<NetworkStats, SourceError> {
    let url = format!("{base_url}/coins/151.json");
    let body = client.get_text(&url).await?;
    parse_coin_stats(&url, &body)
}

fn parse_coin_stats(url: &str, body: &str) -> Result<NetworkStats, SourceError> {
    let coin: CoinResponse =
        serde_json::from_str(body).map_err(|e| SourceError::decode(url, e))?;
    let block_time_secs = coin
        .block_time
        .trim()
        .parse::<f64>()
        .map_err(|e| SourceError::decode(url, format!("block_time {:?}: {e}", coin.block_time)))?;
    Ok(NetworkStats {
        block_time_secs,
        block_reward: coin.block_reward,
        block_reward_24h: coin.block_reward_24h,
        block_reward_3d: coin.block_reward_3d,
        block_reward_7d: coin.block_reward_7d,
        last_block: coin.last_block,
        difficulty: coin.difficulty,
        difficulty_24h: coin.difficulty_24h,
        difficulty_3d: coin.difficulty_3d,
        difficulty_7d: coin.difficulty_7d,
        network_hashrate: coin.nethash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://whattomine.com/coins/151.json";

    fn coin_body(block_time: &str) -> String {
        format!(
            r#"{{
                "id": 151,
                "name": "Ethereum",
                "tag": "ETH",
                "block_time": "{block_time}",
                "block_reward": 2.0,
                "block_reward24": 2.1,
                "block_reward3": 2.2,
                "block_reward7": 2.3,
                "last_block": 12345678,
                "difficulty": 1e15,
                "difficulty24": 2e15,
                "difficulty3": 3e15,
                "difficulty7": 4e15,
                "nethash": 500000000000000
            }}"#
        )
    }

    #[test]
    fn parses_stats_and_block_time_string() {
        let stats = parse_coin_stats(URL, &coin_body("13.5")).unwrap();
        assert_eq!(stats.block_time_secs, 13.5);
        assert_eq!(stats.block_reward, 2.0);
        assert_eq!(stats.block_reward_7d, 2.3);
        assert_eq!(stats.last_block, 12_345_678);
        assert_eq!(stats.difficulty_24h, 2e15);
        assert_eq!(stats.network_hashrate, 5e14);
    }

    #[test]
    fn unparseable_block_time_is_a_decode_error() {
        let err = parse_coin_stats(URL, &coin_body("soon")).unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let err = parse_coin_stats(URL, r#"{"block_time":"13.5"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }
}
