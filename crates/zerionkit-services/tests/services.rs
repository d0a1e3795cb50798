//! End-to-end service tests against a local mock API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zerionkit_core::{ApiError, ClientConfig};
use zerionkit_http::HttpTransport;
use zerionkit_services::models::GasType;
use zerionkit_services::{Health, NftReference, PositionsQuery, Zerion};

const ADDRESS: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";

fn client_for(uri: &str) -> Zerion {
    let config = ClientConfig::builder("zk_dev_abc123")
        .base_url(uri)
        .max_retries(0)
        .retry_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    Zerion::with_transport(Arc::new(HttpTransport::new(&config).unwrap()))
}

fn chain_json(id: &str, external_id: &str, name: &str, trading: bool) -> serde_json::Value {
    json!({
        "type": "chains",
        "id": id,
        "attributes": {
            "external_id": external_id,
            "name": name,
            "flags": { "supports_trading": trading }
        }
    })
}

fn gas_price_json(chain_id: &str, gas_type: &str, standard: &str) -> serde_json::Value {
    json!({
        "type": "gas-prices",
        "id": format!("{chain_id}-{gas_type}"),
        "attributes": {
            "gas_type": gas_type,
            "updated_at": 1_700_000_000,
            "info": { "slow": "10", "standard": standard, "fast": "40" }
        },
        "relationships": {
            "chain": { "data": { "type": "chains", "id": chain_id } }
        }
    })
}

#[tokio::test]
async fn chain_list_is_cached_between_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/chains/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                chain_json("ethereum", "1", "Ethereum", true),
                chain_json("sepolia", "11155111", "Ethereum Sepolia", false),
            ],
            "links": { "self": "/v1/chains/" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let first = client.chains().chains(true).await.unwrap();
    let second = client.chains().chains(true).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].id, second[0].id);
}

#[tokio::test]
async fn refresh_cache_forces_a_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/chains/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [chain_json("ethereum", "1", "Ethereum", true)],
            "links": { "self": "/v1/chains/" }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client.chains().chains(true).await.unwrap();
    client.chains().refresh_cache().await.unwrap();
}

#[tokio::test]
async fn derived_chain_views_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/chains/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                chain_json("ethereum", "1", "Ethereum", true),
                chain_json("arbitrum", "42161", "Arbitrum One", true),
                chain_json("sepolia", "11155111", "Ethereum Sepolia", false),
            ],
            "links": { "self": "/v1/chains/" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let trading = client.chains().trading_chains().await.unwrap();
    let l2 = client.chains().l2_chains().await.unwrap();
    let stats = client.chains().chain_stats().await.unwrap();

    assert_eq!(trading.len(), 2);
    assert_eq!(l2.len(), 1);
    assert_eq!(l2[0].id, "arbitrum");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.testnet, 1);
    assert_eq!(stats.mainnet, 2);
}

#[tokio::test]
async fn positions_pagination_follows_cursors() {
    let server = MockServer::start().await;
    let address = ADDRESS.to_lowercase();
    let positions_path = format!("/v1/wallets/{address}/positions/");

    let position = |id: &str| {
        json!({
            "type": "positions",
            "id": id,
            "attributes": {
                "name": "Asset",
                "position_type": "wallet",
                "quantity": { "int": "1000000", "decimals": 6, "float": 1.0, "numeric": "1.0" },
                "value": 1.0,
                "fungible_info": { "name": "USD Coin", "symbol": "USDC" }
            },
            "relationships": {
                "chain": { "data": { "type": "chains", "id": "ethereum" } }
            }
        })
    };

    Mock::given(method("GET"))
        .and(path(positions_path.clone()))
        .and(query_param("page[after]", "cursor-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [position("pos-3")],
            "links": { "self": "x" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(positions_path.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [position("pos-1"), position("pos-2")],
            "links": {
                "self": "x",
                "next": format!("{}{}?page[after]=cursor-2", server.uri(), positions_path)
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let all = client
        .wallets()
        .all_positions(ADDRESS, &PositionsQuery::default())
        .await
        .unwrap();

    let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["pos-1", "pos-2", "pos-3"]);
}

#[tokio::test]
async fn full_traversal_overrides_caller_paging() {
    let server = MockServer::start().await;
    let address = ADDRESS.to_lowercase();
    let positions_path = format!("/v1/wallets/{address}/positions/");

    Mock::given(method("GET"))
        .and(path(positions_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "links": { "self": "x" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let params = PositionsQuery {
        page_size: Some(5),
        page_after: Some("stale-cursor".into()),
        ..Default::default()
    };
    client
        .wallets()
        .all_positions(ADDRESS, &params)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let sizes: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "page[size]")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(sizes, ["100"]);
    assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "page[after]"));
}

#[tokio::test]
async fn malformed_address_never_reaches_the_wire() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri());

    let err = client
        .wallets()
        .all_positions("not-an-address", &PositionsQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn gas_prices_deserialize_and_estimate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gas-prices/"))
        .and(query_param("filter[chain_ids]", "ethereum"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                gas_price_json("ethereum", "classic", "20000000000"),
                gas_price_json("ethereum", "eip1559", "25000000000"),
            ],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let estimate = client
        .gas()
        .estimate_transaction_cost("ethereum", 21_000, GasType::Classic)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(estimate.gas_price_wei, 20_000_000_000);
    assert_eq!(estimate.total_wei, 420_000_000_000_000);

    let by_type = client
        .gas()
        .chain_gas_prices_by_type("ethereum")
        .await
        .unwrap();
    assert!(by_type.contains_key(&GasType::Classic));
    assert!(by_type.contains_key(&GasType::Eip1559));
    assert!(!by_type.contains_key(&GasType::Optimistic));
}

#[tokio::test]
async fn gas_cache_serves_repeat_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gas-prices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [gas_price_json("ethereum", "classic", "20000000000")],
            "links": { "self": "x" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client
        .gas()
        .chain_gas_prices("ethereum", true)
        .await
        .unwrap();
    let second = client
        .gas()
        .chain_gas_prices("ethereum", true)
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn nft_reference_lookup_builds_the_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/nfts/"))
        .and(query_param("filter[references]", "ethereum:0xabc:42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "nfts",
                "id": "nft-1",
                "attributes": {
                    "token_id": "42",
                    "contract_address": "0xabc",
                    "name": "Punk"
                }
            }],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let reference: NftReference = "ethereum:0xabc:42".parse().unwrap();
    let nft = client
        .nfts()
        .by_reference(&reference, &[])
        .await
        .unwrap()
        .expect("nft should resolve");
    assert_eq!(nft.attributes.token_id, "42");
}

#[tokio::test]
async fn market_overview_combines_assets_and_chains() {
    let server = MockServer::start().await;
    let fungible = |id: &str, symbol: &str| {
        json!({
            "type": "fungibles",
            "id": id,
            "attributes": { "name": id, "symbol": symbol }
        })
    };

    Mock::given(method("GET"))
        .and(path("/v1/fungibles/"))
        .and(query_param("sort", "-market_data.market_cap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [fungible("bitcoin", "BTC"), fungible("ethereum", "ETH")],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/fungibles/"))
        .and(query_param("sort", "market_data.price.percent_change_1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [fungible("pepe", "PEPE")],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/chains/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                chain_json("ethereum", "1", "Ethereum", true),
                chain_json("kava", "2222", "Kava", true),
            ],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let overview = client.market_overview().await.unwrap();

    assert_eq!(overview.top_assets.len(), 2);
    assert_eq!(overview.trending[0].attributes.symbol, "PEPE");
    assert_eq!(overview.total_chains, 2);
    // Kava is not in the popular set.
    assert_eq!(overview.popular_chains.len(), 1);
    assert_eq!(overview.popular_chains[0].id, "ethereum");
}

#[tokio::test]
async fn batch_summaries_keep_per_wallet_failures() {
    let server = MockServer::start().await;
    let good = ADDRESS.to_lowercase();
    let bad = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";

    Mock::given(method("GET"))
        .and(path(format!("/v1/wallets/{good}/portfolio")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "type": "portfolio", "id": good, "attributes": { "total": { "positions": 12.5 } } },
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/wallets/{good}/pnl/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "type": "wallet-pnl",
                "id": good,
                "attributes": {
                    "net_invested": 10.0,
                    "realized_gain": 1.0,
                    "received_external": 0.0,
                    "received_for_nfts": 0.0,
                    "sent_external": 0.0,
                    "sent_for_nfts": 0.0,
                    "total_fee": 0.5,
                    "unrealized_gain": 2.0
                }
            },
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/wallets/{good}/nft-portfolio")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "type": "nft-portfolio", "id": good, "attributes": {} },
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/wallets/{good}/positions/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/wallets/{good}/transactions/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let summaries = client
        .batch_wallet_summaries(&[ADDRESS.to_string(), bad.to_string()])
        .await;

    assert_eq!(summaries.len(), 2);
    let ok = summaries[ADDRESS].as_ref().unwrap();
    assert_eq!(ok.pnl.attributes.unrealized_gain, 2.0);
    assert!(summaries[bad].is_err());
}

#[tokio::test]
async fn health_degrades_when_one_probe_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/chains/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [chain_json("ethereum", "1", "Ethereum", true)],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/gas-prices/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errors": [{ "detail": "upstream outage", "code": "UPSTREAM" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let health = client.health_status().await;
    assert_eq!(health.status, Health::Degraded);
    assert_eq!(health.services["chains"], true);
    assert_eq!(health.services["gas_prices"], false);
}

#[tokio::test]
async fn multi_chain_gas_prices_group_by_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/gas-prices/"))
        .and(query_param("filter[chain_ids]", "ethereum,polygon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                gas_price_json("ethereum", "classic", "20000000000"),
                gas_price_json("polygon", "classic", "30000000000"),
                gas_price_json("polygon", "eip1559", "35000000000"),
            ],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let grouped = client
        .gas()
        .multi_chain_gas_prices(&["ethereum".to_string(), "polygon".to_string()])
        .await
        .unwrap();
    assert_eq!(grouped["ethereum"].len(), 1);
    assert_eq!(grouped["polygon"].len(), 2);
}

#[tokio::test]
async fn swap_offer_deserializes_call_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/swap/offers/"))
        .and(query_param("input[chain_id]", "ethereum"))
        .and(query_param("output[chain_id]", "ethereum"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "swap-offers",
                "id": "offer-1",
                "attributes": {
                    "send_quantity": { "int": "1000000000000000000", "decimals": 18, "float": 1.0, "numeric": "1.0" },
                    "receive_quantity": { "int": "1800000000", "decimals": 6, "float": 1800.0, "numeric": "1800.0" },
                    "data": {
                        "to": "0xrouter",
                        "data": "0xdeadbeef",
                        "value": "0",
                        "gas_limit": "210000"
                    },
                    "meta": { "type": "trade", "to_amount_min": "1790000000" }
                }
            }],
            "links": { "self": "x" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let params = zerionkit_services::SwapOffersQuery {
        input: zerionkit_services::SwapSide::chain("ethereum"),
        input_amount: "1000000000000000000".into(),
        output: zerionkit_services::SwapSide::chain("ethereum"),
        ..Default::default()
    };
    let offer = client
        .swap()
        .best_offer(&params)
        .await
        .unwrap()
        .expect("an offer should be quoted");
    assert_eq!(offer.attributes.data.gas_limit, "210000");
    assert_eq!(offer.attributes.meta.to_amount_min, "1790000000");
}
