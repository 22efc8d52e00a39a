//! HTTP 제공자와 조회 API를 함께 사용하는 통합 테스트.

use std::sync::Arc;

use mockito::{Matcher, Server};
use rust_decimal_macros::dec;

use market_core::{AssetId, FiatCurrency, HistoryTimeframe, ProviderConfig, QueryConfig};
use market_data::selectors;
use market_data::{
    FindByFiatSymbolArgs, FindPriceHistoryByAssetIdArgs, HttpMarketService, ManualConnectivity,
    MarketApi, MarketStore, QueryError, QueryKey,
};

fn api(server: &Server) -> MarketApi {
    let service = HttpMarketService::new(ProviderConfig {
        crypto_base_url: server.url(),
        fiat_base_url: server.url(),
        vs_currency: "usd".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
    .without_coin_list();

    MarketApi::with_config(
        Arc::new(service),
        MarketStore::default(),
        QueryConfig {
            find_all_count: 2,
            refetch_on_reconnect: true,
        },
    )
}

fn eth() -> AssetId {
    "eip155:1/slip44:60".parse().unwrap()
}

const ETH_DETAIL: &str = r#"{"id":"ethereum","market_data":{
    "current_price":{"usd":3000.5},"market_cap":{"usd":100},"total_volume":{"usd":10},
    "price_change_percentage_24h":2.5}}"#;

#[tokio::test]
async fn concurrent_lookups_share_one_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/coins/ethereum")
        .match_query(Matcher::Any)
        .with_body(ETH_DETAIL)
        .expect(1)
        .create_async()
        .await;

    let api = api(&server);
    let id = eth();
    let (a, b) = tokio::join!(api.find_by_asset_id(&id), api.find_by_asset_id(&id));

    mock.assert_async().await;
    assert_eq!(a.unwrap().price, dec!(3000.5));
    assert_eq!(b.unwrap().price, dec!(3000.5));
    assert_eq!(api.store().version(), 1);
}

#[tokio::test]
async fn find_all_then_history_populates_store() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/coins/markets")
        .match_query(Matcher::UrlEncoded("per_page".into(), "2".into()))
        .with_body(
            r#"[{"id":"ethereum","current_price":3000.5,"market_cap":1,"total_volume":1,
                 "price_change_percentage_24h":0.0,"circulating_supply":null,"max_supply":null},
                {"id":"bitcoin","current_price":60000.0,"market_cap":2,"total_volume":2,
                 "price_change_percentage_24h":0.0,"circulating_supply":null,"max_supply":null}]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/coins/ethereum/market_chart")
        .match_query(Matcher::UrlEncoded("days".into(), "7".into()))
        .with_body(r#"{"prices":[[1000,2900.5],[2000,3000.5]]}"#)
        .create_async()
        .await;

    let api = api(&server);
    let all = api.find_all().await.unwrap();
    assert_eq!(all.len(), 2);

    let history = api
        .find_price_history_by_asset_id(FindPriceHistoryByAssetIdArgs {
            asset_id: eth(),
            timeframe: HistoryTimeframe::Week,
        })
        .await
        .unwrap();
    assert_eq!(history.len(), 2);

    let state = api.store().snapshot();
    assert_eq!(selectors::select_market_data_ids(&state).len(), 2);
    assert_eq!(selectors::select_market_data_ids(&state)[0], eth());
    assert_eq!(
        selectors::select_price_history_by_asset_timeframe(&state, &eth(), HistoryTimeframe::Week),
        history.as_slice()
    );
    assert!(selectors::select_price_history_by_asset_timeframe(
        &state,
        &eth(),
        HistoryTimeframe::Day
    )
    .is_empty());
}

#[tokio::test]
async fn provider_failure_maps_to_fixed_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/latest")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let api = api(&server);
    let err = api
        .find_by_fiat_symbol(FindByFiatSymbolArgs {
            symbol: FiatCurrency::EUR,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        QueryError {
            data: "findByFiatSymbol: no market data for EUR".to_string(),
            status: 404,
        }
    );
    assert_eq!(api.store().version(), 0);
}

#[tokio::test]
async fn reconnect_refetches_subscribed_queries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/coins/ethereum")
        .match_query(Matcher::Any)
        .with_body(ETH_DETAIL)
        .expect(2)
        .create_async()
        .await;

    let api = api(&server);
    let connectivity = ManualConnectivity::default();
    let listener = api.listen_for_reconnect(&connectivity).unwrap();

    let mut sub = api.subscribe_find_by_asset_id(&eth());
    let first = sub.settled().await.unwrap();
    assert!(first.is_success());

    connectivity.set_offline();
    tokio::task::yield_now().await;
    connectivity.set_online();

    // 재요청 결과가 반영될 때까지 대기
    loop {
        let state = sub.changed().await.unwrap();
        if state.is_success() && state.fulfilled_at != first.fulfilled_at {
            break;
        }
    }
    assert_eq!(api.queries().subscriber_count(&QueryKey::FindByAssetId(eth())), 1);

    mock.assert_async().await;
    drop(connectivity);
    listener.await.unwrap();
}
