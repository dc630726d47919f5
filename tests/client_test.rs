//! Integration tests for the DexScreener client using wiremock
//!
//! Run with: cargo test --test client_test

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pairscope::dex::DexClient;

fn pair_json(chain: &str, address: &str, base_symbol: &str) -> serde_json::Value {
    json!({
        "chainId": chain,
        "dexId": "uniswap",
        "url": format!("https://dexscreener.com/{}/{}", chain, address),
        "pairAddress": address,
        "baseToken": {
            "address": "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
            "name": "Wrapped BTC",
            "symbol": base_symbol
        },
        "quoteToken": {
            "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "name": "USD Coin",
            "symbol": "USDC"
        },
        "priceNative": "1.0000",
        "priceUsd": "64123.55"
    })
}

#[tokio::test]
async fn test_get_pair_returns_first_match() {
    let server = MockServer::start().await;
    let address = "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640";

    Mock::given(method("GET"))
        .and(path(format!("/pairs/ethereum/{}", address)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemaVersion": "1.0.0",
            "pairs": [pair_json("ethereum", address, "WBTC")]
        })))
        .mount(&server)
        .await;

    let client = DexClient::with_base_url(server.uri()).unwrap();
    let pair = client.get_pair("ethereum", address).await.unwrap().unwrap();

    assert_eq!(pair.chain_id, "ethereum");
    assert_eq!(pair.pair_address, address);
    assert_eq!(pair.base_token.symbol, "WBTC");
    assert_eq!(pair.price_usd.as_deref(), Some("64123.55"));
}

#[tokio::test]
async fn test_get_pair_accepts_singular_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pairs/bsc/0xdeadbeef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemaVersion": "1.0.0",
            "pairs": null,
            "pair": pair_json("bsc", "0xdeadbeef", "WBTC")
        })))
        .mount(&server)
        .await;

    let client = DexClient::with_base_url(server.uri()).unwrap();
    let pair = client.get_pair("bsc", "0xdeadbeef").await.unwrap();

    assert_eq!(pair.unwrap().chain_id, "bsc");
}

#[tokio::test]
async fn test_get_pair_miss_is_none_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pairs/ethereum/0x0000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemaVersion": "1.0.0",
            "pairs": null,
            "pair": null
        })))
        .mount(&server)
        .await;

    let client = DexClient::with_base_url(server.uri()).unwrap();
    assert!(client.get_pair("ethereum", "0x0000").await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_passes_the_query_and_collects_pairs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "WBTC/USDC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemaVersion": "1.0.0",
            "pairs": [
                pair_json("ethereum", "0xaaa", "WBTC"),
                pair_json("arbitrum", "0xbbb", "WBTC")
            ]
        })))
        .mount(&server)
        .await;

    let client = DexClient::with_base_url(server.uri()).unwrap();
    let pairs = client.search_pairs("WBTC/USDC").await.unwrap();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].chain_id, "ethereum");
    assert_eq!(pairs[1].chain_id, "arbitrum");
}

#[tokio::test]
async fn test_search_with_no_matches_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemaVersion": "1.0.0",
            "pairs": null
        })))
        .mount(&server)
        .await;

    let client = DexClient::with_base_url(server.uri()).unwrap();
    assert!(client.search_pairs("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_surfaces_as_err() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = DexClient::with_base_url(server.uri()).unwrap();
    assert!(client.search_pairs("WBTC").await.is_err());
    assert!(client.get_pair("ethereum", "0xaaa").await.is_err());
}
