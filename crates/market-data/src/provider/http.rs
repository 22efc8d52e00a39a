//! reqwest 기반 시세 제공자.
//!
//! - 암호화폐: CoinGecko 호환 REST API
//! - 법정화폐: exchangerate.host 호환 REST API (USD 기준)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, error, instrument, warn};

use market_core::{
    AssetId, FiatCurrency, HistoryData, HistoryTimeframe, MarketData, ProviderConfig,
};

use super::adapter::{AssetIdAdapter, CoinGeckoRef};
use super::coingecko::{
    chart_days, CoinDetail, CoinListEntry, CoinMarket, MarketChart, MAX_PER_PAGE,
};
use super::exchange_rate::{base_history, date_range, LatestRates, TimeseriesRates, DATE_FORMAT};
use crate::error::{ServiceError, ServiceResult};
use crate::service::MarketService;
use crate::state::MarketDataById;

/// HTTP 시세 제공자.
#[derive(Debug, Clone)]
pub struct HttpMarketService {
    config: ProviderConfig,
    client: Client,
    adapter: AssetIdAdapter,
    /// `/coins/list`로 보강된 어댑터. 첫 성공 시 한 번만 채워짐
    resolved: Arc<OnceCell<AssetIdAdapter>>,
    load_coin_list: bool,
    page_size: usize,
}

impl HttpMarketService {
    /// 새 제공자 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ServiceError::Network`를 반환합니다.
    pub fn new(config: ProviderConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            config,
            client,
            adapter: AssetIdAdapter::default(),
            resolved: Arc::new(OnceCell::new()),
            load_coin_list: true,
            page_size: MAX_PER_PAGE,
        })
    }

    /// 자산 식별자 어댑터를 교체합니다.
    pub fn with_adapter(mut self, adapter: AssetIdAdapter) -> Self {
        self.adapter = adapter;
        self.resolved = Arc::new(OnceCell::new());
        self
    }

    /// `/coins/list` 조회 없이 기본 어댑터만 사용합니다.
    pub fn without_coin_list(mut self) -> Self {
        self.load_coin_list = false;
        self
    }

    /// `/coins/markets` 페이지 크기 (최대 250).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn adapter(&self) -> &AssetIdAdapter {
        &self.adapter
    }

    /// 코인 목록으로 보강된 어댑터.
    ///
    /// 목록 조회에 실패하면 기본 어댑터를 쓰고, 다음 호출에서 다시 시도합니다.
    async fn resolved_adapter(&self) -> &AssetIdAdapter {
        if !self.load_coin_list {
            return &self.adapter;
        }

        let loaded = self
            .resolved
            .get_or_try_init(|| async move {
                let coins: Vec<CoinListEntry> = self
                    .get(
                        &self.config.crypto_base_url,
                        "/coins/list",
                        &[("include_platform", "true".to_string())],
                    )
                    .await?;
                let mut adapter = self.adapter.clone();
                adapter.register_coin_list(&coins);
                Ok::<_, ServiceError>(adapter)
            })
            .await;

        match loaded {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!(error = %e, "coin list unavailable, using built-in asset mappings");
                &self.adapter
            }
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        base_url: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ServiceResult<T> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
        debug!(url = %url, ?params, "GET");

        let response = self.client.get(&url).query(params).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ServiceError::Parse(e.to_string())
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(ServiceError::NotFound(body))
        } else {
            Err(ServiceError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn vs_currency(&self) -> String {
        self.config.vs_currency.to_lowercase()
    }

    fn coin_detail_params() -> Vec<(&'static str, String)> {
        vec![
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
        ]
    }
}

#[async_trait]
impl MarketService for HttpMarketService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn find_all(&self, count: usize) -> ServiceResult<MarketDataById<AssetId>> {
        let per_page = count.clamp(1, self.page_size);
        let pages = count.div_ceil(per_page);
        let mut markets: Vec<CoinMarket> = Vec::with_capacity(count);

        for page in 1..=pages {
            let batch: Vec<CoinMarket> = self
                .get(
                    &self.config.crypto_base_url,
                    "/coins/markets",
                    &[
                        ("vs_currency", self.vs_currency()),
                        ("order", "market_cap_desc".to_string()),
                        ("per_page", per_page.to_string()),
                        ("page", page.to_string()),
                        ("sparkline", "false".to_string()),
                    ],
                )
                .await?;

            let last_page = batch.len() < per_page;
            markets.extend(batch);
            if last_page {
                break;
            }
        }
        markets.truncate(count);

        let adapter = self.resolved_adapter().await;
        let total = markets.len();
        let data: MarketDataById<AssetId> = markets
            .iter()
            .filter_map(|market| {
                let asset_id = adapter.to_asset_id(&market.id)?;
                Some((asset_id, market.to_market_data()))
            })
            .collect();

        debug!(fetched = total, mapped = data.len(), "coin markets loaded");
        Ok(data)
    }

    #[instrument(skip_all, fields(asset_id = %asset_id))]
    async fn find_by_asset_id(&self, asset_id: &AssetId) -> ServiceResult<Option<MarketData>> {
        let endpoint = match self.resolved_adapter().await.to_coingecko(asset_id) {
            Some(CoinGeckoRef::Coin(id)) => format!("/coins/{}", id),
            Some(CoinGeckoRef::Contract { platform, address }) => {
                format!("/coins/{}/contract/{}", platform, address)
            }
            None => return Err(ServiceError::Unsupported(asset_id.to_string())),
        };

        let detail: CoinDetail = match self
            .get(
                &self.config.crypto_base_url,
                &endpoint,
                &Self::coin_detail_params(),
            )
            .await
        {
            Ok(detail) => detail,
            Err(ServiceError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(detail.to_market_data(&self.vs_currency()))
    }

    #[instrument(skip_all, fields(asset_id = %asset_id, timeframe = %timeframe))]
    async fn find_price_history_by_asset_id(
        &self,
        asset_id: &AssetId,
        timeframe: HistoryTimeframe,
    ) -> ServiceResult<Vec<HistoryData>> {
        let coin_id = match self.resolved_adapter().await.to_coingecko(asset_id) {
            Some(CoinGeckoRef::Coin(id)) => id,
            // market_chart는 컨트랙트 경로를 별도로 가짐
            Some(CoinGeckoRef::Contract { platform, address }) => {
                format!("{}/contract/{}", platform, address)
            }
            None => return Err(ServiceError::Unsupported(asset_id.to_string())),
        };

        let chart: MarketChart = self
            .get(
                &self.config.crypto_base_url,
                &format!("/coins/{}/market_chart", coin_id),
                &[
                    ("vs_currency", self.vs_currency()),
                    ("days", chart_days(timeframe).to_string()),
                ],
            )
            .await?;

        // 1일 데이터에서 마지막 1시간만 사용
        let since = match timeframe {
            HistoryTimeframe::Hour => Some((Utc::now() - chrono::Duration::hours(1)).timestamp_millis()),
            _ => None,
        };
        Ok(chart.to_history(since))
    }

    #[instrument(skip(self))]
    async fn find_by_fiat_symbol(&self, symbol: FiatCurrency) -> ServiceResult<Option<MarketData>> {
        if symbol == FiatCurrency::BASE {
            return Ok(Some(MarketData::from_price(rust_decimal::Decimal::ONE)));
        }

        let latest: LatestRates = self
            .get(
                &self.config.fiat_base_url,
                "/latest",
                &[
                    ("base", FiatCurrency::BASE.code().to_string()),
                    ("symbols", symbol.code().to_string()),
                ],
            )
            .await?;

        Ok(latest.to_market_data(symbol))
    }

    #[instrument(skip(self))]
    async fn find_price_history_by_fiat_symbol(
        &self,
        symbol: FiatCurrency,
        timeframe: HistoryTimeframe,
    ) -> ServiceResult<Vec<HistoryData>> {
        let (start, end) = date_range(timeframe, Utc::now());
        if symbol == FiatCurrency::BASE {
            return Ok(base_history(start, end));
        }

        let series: TimeseriesRates = self
            .get(
                &self.config.fiat_base_url,
                "/timeseries",
                &[
                    ("base", FiatCurrency::BASE.code().to_string()),
                    ("symbols", symbol.code().to_string()),
                    ("start_date", start.format(DATE_FORMAT).to_string()),
                    ("end_date", end.format(DATE_FORMAT).to_string()),
                ],
            )
            .await?;

        Ok(series.to_history(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use rust_decimal_macros::dec;

    fn service(server: &Server) -> HttpMarketService {
        HttpMarketService::new(ProviderConfig {
            crypto_base_url: server.url(),
            fiat_base_url: server.url(),
            vs_currency: "USD".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
        .without_coin_list()
    }

    fn market_json(id: &str, price: f64) -> String {
        format!(
            r#"{{"id":"{}","current_price":{},"market_cap":1000,"total_volume":10,
                "price_change_percentage_24h":1.5,"circulating_supply":null,"max_supply":null}}"#,
            id, price
        )
    }

    #[tokio::test]
    async fn test_find_all_pages_and_maps_ids() {
        let mut server = Server::new_async().await;

        let page1 = format!(
            "[{},{}]",
            market_json("bitcoin", 60000.0),
            market_json("unknown-coin", 1.0)
        );
        let page2 = format!("[{}]", market_json("ethereum", 3000.5));

        let m1 = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(page1)
            .create_async()
            .await;
        let m2 = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_header("content-type", "application/json")
            .with_body(page2)
            .create_async()
            .await;

        let svc = service(&server).with_page_size(2);
        // 2개씩 페이지 → 3개 요청이면 2페이지 필요
        let data = svc.find_all(3).await.unwrap();

        m1.assert_async().await;
        m2.assert_async().await;

        let btc: AssetId = "bip122:000000000019d6689c085ae165831e93/slip44:0"
            .parse()
            .unwrap();
        let eth: AssetId = "eip155:1/slip44:60".parse().unwrap();
        let ids: Vec<_> = data.keys().cloned().collect();
        assert_eq!(ids, vec![btc, eth.clone()]);
        assert_eq!(data.get(&eth).unwrap().price, dec!(3000.5));
    }

    #[tokio::test]
    async fn test_find_all_maps_listed_tokens() {
        let mut server = Server::new_async().await;

        let list = server
            .mock("GET", "/coins/list")
            .match_query(Matcher::UrlEncoded("include_platform".into(), "true".into()))
            .with_body(
                r#"[
                    {"id":"bitcoin","symbol":"btc","name":"Bitcoin","platforms":{}},
                    {"id":"pepe","symbol":"pepe","name":"Pepe",
                     "platforms":{"ethereum":"0x6982508145454Ce325dDbE47a25d4ec3d2311933"}},
                    {"id":"quickswap","symbol":"quick","name":"Quickswap",
                     "platforms":{"polygon-pos":"0xb5c064f955d8e7f38fe0460c556a72987494ee17"}},
                    {"id":"solana","symbol":"sol","name":"Solana","platforms":{"":""}}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;
        let markets = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .with_body(format!(
                "[{},{},{},{}]",
                market_json("bitcoin", 60000.0),
                market_json("pepe", 0.00001),
                market_json("solana", 150.0),
                market_json("quickswap", 0.05)
            ))
            .expect(2)
            .create_async()
            .await;

        let svc = HttpMarketService::new(ProviderConfig {
            crypto_base_url: server.url(),
            fiat_base_url: server.url(),
            vs_currency: "USD".to_string(),
            timeout_secs: 5,
        })
        .unwrap();

        let data = svc.find_all(10).await.unwrap();
        let ids: Vec<String> = data.keys().map(|id| id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "bip122:000000000019d6689c085ae165831e93/slip44:0".to_string(),
                "eip155:1/erc20:0x6982508145454ce325ddbe47a25d4ec3d2311933".to_string(),
                "eip155:137/erc20:0xb5c064f955d8e7f38fe0460c556a72987494ee17".to_string(),
            ]
        );

        // 목록은 한 번만 조회
        svc.find_all(10).await.unwrap();
        list.assert_async().await;
        markets.assert_async().await;
    }

    #[tokio::test]
    async fn test_coin_list_failure_falls_back_to_builtin() {
        let mut server = Server::new_async().await;

        let list = server
            .mock("GET", "/coins/list")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("rate limited")
            .expect(2)
            .create_async()
            .await;
        server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .with_body(format!(
                "[{},{}]",
                market_json("ethereum", 3000.0),
                market_json("pepe", 0.00001)
            ))
            .create_async()
            .await;

        let svc = HttpMarketService::new(ProviderConfig {
            crypto_base_url: server.url(),
            fiat_base_url: server.url(),
            vs_currency: "USD".to_string(),
            timeout_secs: 5,
        })
        .unwrap();

        // 실패는 캐시되지 않아 다음 호출에서 다시 조회
        for _ in 0..2 {
            let data = svc.find_all(10).await.unwrap();
            let ids: Vec<String> = data.keys().map(|id| id.to_string()).collect();
            assert_eq!(ids, vec!["eip155:1/slip44:60".to_string()]);
        }
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_find_by_asset_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/coins/ethereum")
            .match_query(Matcher::Any)
            .with_body(
                r#"{"id":"ethereum","market_data":{
                    "current_price":{"usd":3000.25},
                    "market_cap":{"usd":1},
                    "total_volume":{"usd":2},
                    "price_change_percentage_24h":-0.5}}"#,
            )
            .create_async()
            .await;

        let svc = service(&server);
        let eth: AssetId = "eip155:1/slip44:60".parse().unwrap();
        let data = svc.find_by_asset_id(&eth).await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(data.price, dec!(3000.25));
        assert_eq!(data.change_percent_24hr, -0.5);
    }

    #[tokio::test]
    async fn test_find_by_asset_id_contract_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/coins/ethereum/contract/0x0000000000000000000000000000000000000001",
            )
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"coin not found"}"#)
            .create_async()
            .await;

        let svc = service(&server);
        let token: AssetId = "eip155:1/erc20:0x0000000000000000000000000000000000000001"
            .parse()
            .unwrap();
        assert_eq!(svc.find_by_asset_id(&token).await.unwrap(), None);
        mock.assert_async().await;

        let unsupported: AssetId = "cosmos:juno-1/slip44:118".parse().unwrap();
        assert!(matches!(
            svc.find_by_asset_id(&unsupported).await,
            Err(ServiceError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_price_history() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
                Matcher::UrlEncoded("days".into(), "365".into()),
            ]))
            .with_body(r#"{"prices":[[1000,1.5],[2000,2.5]],"market_caps":[],"total_volumes":[]}"#)
            .create_async()
            .await;

        let svc = service(&server);
        let btc: AssetId = "bip122:000000000019d6689c085ae165831e93/slip44:0"
            .parse()
            .unwrap();
        let history = svc
            .find_price_history_by_asset_id(&btc, HistoryTimeframe::Year)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            history,
            vec![HistoryData::new(dec!(1.5), 1000), HistoryData::new(dec!(2.5), 2000)]
        );
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let svc = service(&server);
        let btc: AssetId = "bip122:000000000019d6689c085ae165831e93/slip44:0"
            .parse()
            .unwrap();
        let err = svc
            .find_price_history_by_asset_id(&btc, HistoryTimeframe::Day)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Http { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fiat_latest() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/latest")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("base".into(), "USD".into()),
                Matcher::UrlEncoded("symbols".into(), "EUR".into()),
            ]))
            .with_body(r#"{"base":"USD","rates":{"EUR":0.5}}"#)
            .create_async()
            .await;

        let svc = service(&server);
        let eur = svc.find_by_fiat_symbol(FiatCurrency::EUR).await.unwrap();
        mock.assert_async().await;
        assert_eq!(eur.unwrap().price, dec!(0.5));

        // 기준 통화는 요청 없이 1
        let usd = svc.find_by_fiat_symbol(FiatCurrency::USD).await.unwrap();
        assert_eq!(usd.unwrap().price, dec!(1));
    }

    #[tokio::test]
    async fn test_fiat_timeseries() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/timeseries")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbols".into(), "GBP".into()),
                Matcher::Regex("start_date=\\d{4}-\\d{2}-\\d{2}".into()),
            ]))
            .with_body(r#"{"rates":{"2024-01-02":{"GBP":0.75},"2024-01-01":{"GBP":0.5}}}"#)
            .create_async()
            .await;

        let svc = service(&server);
        let history = svc
            .find_price_history_by_fiat_symbol(FiatCurrency::GBP, HistoryTimeframe::Week)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(history.len(), 2);
        assert!(history[0].date < history[1].date);
        assert_eq!(history[0].price, dec!(0.5));
    }
}
