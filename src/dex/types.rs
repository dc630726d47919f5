//! Serde models of the DexScreener pair payload
//!
//! Consumed immutably for rendering; never cached beyond the current
//! request. Fields the API omits for thin pairs are defaulted.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One token pair as reported by the provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub chain_id: String,
    pub dex_id: String,
    pub url: String,
    pub pair_address: String,
    pub base_token: Token,
    pub quote_token: Token,
    pub price_native: Option<String>,
    pub price_usd: Option<String>,
    #[serde(default)]
    pub txns: TxnStats,
    #[serde(default)]
    pub volume: PeriodStats,
    #[serde(default)]
    pub price_change: PeriodStats,
    pub liquidity: Option<Liquidity>,
    pub fdv: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub pair_created_at: Option<i64>,
}

impl TokenPair {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.pair_created_at.and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// Buy/sell counts over the standard reporting windows
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxnStats {
    #[serde(default)]
    pub m5: TxnCount,
    #[serde(default)]
    pub h1: TxnCount,
    #[serde(default)]
    pub h6: TxnCount,
    #[serde(default)]
    pub h24: TxnCount,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TxnCount {
    #[serde(default)]
    pub buys: u64,
    #[serde(default)]
    pub sells: u64,
}

/// One numeric series (volume or price change) over the reporting windows
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PeriodStats {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

/// Envelope of both the `/pairs/{chain}/{address}` and `/search` endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<TokenPair>>,
    #[serde(default)]
    pub pair: Option<TokenPair>,
}

/// Shared fixture for unit tests across the crate
#[cfg(test)]
pub(crate) fn sample_pair() -> TokenPair {
    serde_json::from_str(tests::SAMPLE_PAIR_JSON).expect("fixture must parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const SAMPLE_PAIR_JSON: &str = r#"{
        "chainId": "ethereum",
        "dexId": "uniswap",
        "url": "https://dexscreener.com/ethereum/0xpair",
        "pairAddress": "0xPair",
        "baseToken": {"address": "0xBase", "name": "Wrapped BTC", "symbol": "WBTC"},
        "quoteToken": {"address": "0xQuote", "name": "USD Coin", "symbol": "USDC"},
        "priceNative": "15.95",
        "priceUsd": "64123.12",
        "txns": {"m5": {"buys": 1, "sells": 2}, "h1": {"buys": 10, "sells": 8}, "h6": {"buys": 40, "sells": 41}, "h24": {"buys": 100, "sells": 90}},
        "volume": {"m5": 1000.0, "h1": 20000.5, "h6": 90000.0, "h24": 500000.0},
        "priceChange": {"m5": 0.1, "h1": -1.2, "h6": 3.4, "h24": -5.6},
        "liquidity": {"usd": 1234567.0, "base": 19.2, "quote": 600000.0},
        "fdv": 9999999.0,
        "pairCreatedAt": 1620000000000
    }"#;

    #[test]
    fn test_deserialize_full_pair() {
        let pair: TokenPair = serde_json::from_str(SAMPLE_PAIR_JSON).unwrap();
        assert_eq!(pair.chain_id, "ethereum");
        assert_eq!(pair.base_token.symbol, "WBTC");
        assert_eq!(pair.txns.h24.buys, 100);
        assert_eq!(pair.volume.h1, Some(20000.5));
        assert_eq!(pair.created_at().unwrap().timestamp_millis(), 1620000000000);
    }

    #[test]
    fn test_thin_pair_defaults_stat_blocks() {
        let json = r#"{
            "chainId": "ton",
            "dexId": "stonfi",
            "url": "https://dexscreener.com/ton/abc",
            "pairAddress": "abc",
            "baseToken": {"address": "a", "name": "A", "symbol": "A"},
            "quoteToken": {"address": "b", "name": "B", "symbol": "B"}
        }"#;
        let pair: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.txns.m5.buys, 0);
        assert_eq!(pair.volume.h24, None);
        assert!(pair.liquidity.is_none());
        assert!(pair.created_at().is_none());
    }
}
