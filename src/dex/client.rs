//! Thin client over the DexScreener latest/dex API
//!
//! No retry policy: a transient provider failure is reported to the caller,
//! which degrades it to a user-visible not-found.

use reqwest::{Client, ClientBuilder};

use super::types::{PairsResponse, TokenPair};
use crate::core::{config, AppResult};

pub struct DexClient {
    http: Client,
    base_url: String,
}

impl DexClient {
    pub fn new() -> AppResult<Self> {
        Self::with_base_url(config::dex::API_URL.clone())
    }

    /// Client against a specific base URL (used by tests to point at a stub)
    pub fn with_base_url(base_url: impl Into<String>) -> AppResult<Self> {
        let http = ClientBuilder::new().timeout(config::network::timeout()).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Look up a single pair by chain id and pair address
    pub async fn get_pair(&self, chain: &str, address: &str) -> AppResult<Option<TokenPair>> {
        let url = format!("{}/pairs/{}/{}", self.base_url, chain, address);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let body: PairsResponse = resp.json().await?;

        // The endpoint reports either a `pairs` list or a single `pair`
        let pair = body
            .pairs
            .and_then(|pairs| pairs.into_iter().next())
            .or(body.pair);
        Ok(pair)
    }

    /// Search pairs by token name, symbol, or address
    pub async fn search_pairs(&self, query: &str) -> AppResult<Vec<TokenPair>> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?;
        let body: PairsResponse = resp.json().await?;
        Ok(body.pairs.unwrap_or_default())
    }
}
