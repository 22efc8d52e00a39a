//! 시장 데이터 조회 엔드포인트.
//!
//! 각 엔드포인트의 동작:
//!
//! ```text
//! 시세 제공자 호출
//!     │
//!     ├── 성공 ──> 스토어에 변경 액션 적용 ──> 결과 반환
//!     │
//!     └── 실패/빈 결과 ──> QueryError { data, status } 반환 (액션 없음)
//! ```
//!
//! | 엔드포인트 | 실패 status |
//! |---|---|
//! | findAll, findByAssetId, findByFiatSymbol | 404 |
//! | findPriceHistoryByAssetId, findPriceHistoryByFiatSymbol | 400 |
//!
//! 같은 키의 동시 요청은 `QueryCache`가 하나로 합칩니다.
//! 재시도, 타임아웃 정책, 취소는 없습니다.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

use market_core::{AssetId, FiatCurrency, HistoryData, MarketData, QueryConfig};

use crate::error::{QueryError, QueryResult};
use crate::query::{
    refetch_subscribed, spawn_refetch_on_reconnect, ConnectivityObserver, QueryCache, QueryData,
    QueryExecutor, QueryKey, QueryStatus, QuerySubscription,
};
use crate::service::MarketService;
use crate::state::{
    FindByFiatSymbolArgs, FindPriceHistoryByAssetIdArgs, FindPriceHistoryByFiatSymbolArgs,
    MarketDataAction, MarketDataById, PriceHistoryPayload,
};
use crate::store::MarketStore;

/// 키별 고정 오류 값.
pub fn endpoint_error(key: &QueryKey) -> QueryError {
    match key {
        QueryKey::FindAll => QueryError::not_found("findAll: no market data"),
        QueryKey::FindByAssetId(asset_id) => {
            QueryError::not_found(format!("findByAssetId: no market data for {}", asset_id))
        }
        QueryKey::FindPriceHistoryByAssetId(args) => QueryError::bad_request(format!(
            "findPriceHistoryByAssetId: error fetching price history for {}",
            args.asset_id
        )),
        QueryKey::FindByFiatSymbol(args) => {
            QueryError::not_found(format!("findByFiatSymbol: no market data for {}", args.symbol))
        }
        QueryKey::FindPriceHistoryByFiatSymbol(args) => QueryError::bad_request(format!(
            "findPriceHistoryByFiatSymbol: error fetching price history for {}",
            args.symbol
        )),
    }
}

struct ApiInner {
    service: Arc<dyn MarketService>,
    store: MarketStore,
    queries: QueryCache,
    config: QueryConfig,
}

/// 시장 데이터 조회 API.
///
/// 복제본은 같은 스토어와 조회 캐시를 공유합니다.
#[derive(Clone)]
pub struct MarketApi {
    inner: Arc<ApiInner>,
}

impl std::fmt::Debug for MarketApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketApi")
            .field("service", &self.inner.service.name())
            .field("store", &self.inner.store)
            .field("queries", &self.inner.queries)
            .finish()
    }
}

impl MarketApi {
    pub fn new(service: Arc<dyn MarketService>, store: MarketStore) -> Self {
        Self::with_config(service, store, QueryConfig::default())
    }

    pub fn with_config(
        service: Arc<dyn MarketService>,
        store: MarketStore,
        config: QueryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                service,
                store,
                queries: QueryCache::new(),
                config,
            }),
        }
    }

    pub fn store(&self) -> &MarketStore {
        &self.inner.store
    }

    pub fn queries(&self) -> &QueryCache {
        &self.inner.queries
    }

    // =========================================================================
    // 엔드포인트
    // =========================================================================

    /// 시가총액 상위 자산 시세 (기본 1000개)로 암호화폐 캐시를 채웁니다.
    pub async fn find_all(&self) -> QueryResult<MarketDataById<AssetId>> {
        let key = QueryKey::FindAll;
        match self.run(key.clone()).await? {
            QueryData::MarketCaps(data) => Ok(data),
            _ => Err(endpoint_error(&key)),
        }
    }

    /// 자산 하나의 현재 시세.
    pub async fn find_by_asset_id(&self, asset_id: &AssetId) -> QueryResult<MarketData> {
        let key = QueryKey::FindByAssetId(asset_id.clone());
        match self.run(key.clone()).await? {
            QueryData::Market(data) => Ok(data),
            _ => Err(endpoint_error(&key)),
        }
    }

    /// 자산 하나의 가격 이력.
    pub async fn find_price_history_by_asset_id(
        &self,
        args: FindPriceHistoryByAssetIdArgs,
    ) -> QueryResult<Vec<HistoryData>> {
        let key = QueryKey::FindPriceHistoryByAssetId(args);
        match self.run(key.clone()).await? {
            QueryData::PriceHistory(data) => Ok(data),
            _ => Err(endpoint_error(&key)),
        }
    }

    /// 법정화폐 하나의 현재 시세.
    pub async fn find_by_fiat_symbol(&self, args: FindByFiatSymbolArgs) -> QueryResult<MarketData> {
        let key = QueryKey::FindByFiatSymbol(args);
        match self.run(key.clone()).await? {
            QueryData::Market(data) => Ok(data),
            _ => Err(endpoint_error(&key)),
        }
    }

    /// 법정화폐 하나의 가격 이력.
    pub async fn find_price_history_by_fiat_symbol(
        &self,
        args: FindPriceHistoryByFiatSymbolArgs,
    ) -> QueryResult<Vec<HistoryData>> {
        let key = QueryKey::FindPriceHistoryByFiatSymbol(args);
        match self.run(key.clone()).await? {
            QueryData::PriceHistory(data) => Ok(data),
            _ => Err(endpoint_error(&key)),
        }
    }

    // =========================================================================
    // 구독
    // =========================================================================

    pub fn subscribe_find_all(&self) -> QuerySubscription {
        self.subscribe(QueryKey::FindAll)
    }

    pub fn subscribe_find_by_asset_id(&self, asset_id: &AssetId) -> QuerySubscription {
        self.subscribe(QueryKey::FindByAssetId(asset_id.clone()))
    }

    pub fn subscribe_find_price_history_by_asset_id(
        &self,
        args: FindPriceHistoryByAssetIdArgs,
    ) -> QuerySubscription {
        self.subscribe(QueryKey::FindPriceHistoryByAssetId(args))
    }

    pub fn subscribe_find_by_fiat_symbol(&self, args: FindByFiatSymbolArgs) -> QuerySubscription {
        self.subscribe(QueryKey::FindByFiatSymbol(args))
    }

    pub fn subscribe_find_price_history_by_fiat_symbol(
        &self,
        args: FindPriceHistoryByFiatSymbolArgs,
    ) -> QuerySubscription {
        self.subscribe(QueryKey::FindPriceHistoryByFiatSymbol(args))
    }

    /// 키를 구독합니다. 아직 요청된 적 없는 키면 요청을 시작합니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn subscribe(&self, key: QueryKey) -> QuerySubscription {
        let subscription = self.inner.queries.subscribe(key.clone());
        if subscription.state().status == QueryStatus::Uninitialized {
            let _ = self.inner.queries.start(key.clone(), || self.fetcher(&key));
        }
        subscription
    }

    // =========================================================================
    // 재요청
    // =========================================================================

    /// 구독 중인 모든 조회를 다시 요청합니다.
    pub fn refetch_subscribed(&self) -> usize {
        refetch_subscribed(&self.inner.queries, self)
    }

    /// 재연결 시 구독 중인 조회를 다시 요청하는 태스크를 시작합니다.
    ///
    /// 설정에서 비활성화된 경우 `None`.
    pub fn listen_for_reconnect(
        &self,
        observer: &dyn ConnectivityObserver,
    ) -> Option<JoinHandle<()>> {
        if !self.inner.config.refetch_on_reconnect {
            return None;
        }
        Some(spawn_refetch_on_reconnect(
            self.inner.queries.clone(),
            Arc::new(self.clone()),
            observer,
        ))
    }

    /// 조회 캐시와 스토어를 모두 초기 상태로 되돌립니다.
    pub fn reset(&self) {
        // 스토어 세대를 먼저 넘겨야 사이에 시작된 요청이 이전 세대를 잡지 않음
        self.inner.store.reset();
        self.inner.queries.reset();
    }

    async fn run(&self, key: QueryKey) -> QueryResult<QueryData> {
        self.inner
            .queries
            .run(key.clone(), || self.fetcher(&key))
            .await
    }
}

impl QueryExecutor for MarketApi {
    fn fetcher(&self, key: &QueryKey) -> BoxFuture<'static, QueryResult<QueryData>> {
        let service = self.inner.service.clone();
        // 요청 생성 시점의 세대에만 결과를 반영
        let store = EpochDispatcher {
            epoch: self.inner.store.epoch(),
            store: self.inner.store.clone(),
        };
        let count = self.inner.config.find_all_count;
        let key = key.clone();

        async move {
            let service = service.as_ref();
            match key {
                QueryKey::FindAll => fetch_all(service, &store, count)
                    .await
                    .map(QueryData::MarketCaps),
                QueryKey::FindByAssetId(asset_id) => fetch_by_asset_id(service, &store, asset_id)
                    .await
                    .map(QueryData::Market),
                QueryKey::FindPriceHistoryByAssetId(args) => {
                    fetch_price_history_by_asset_id(service, &store, args)
                        .await
                        .map(QueryData::PriceHistory)
                }
                QueryKey::FindByFiatSymbol(args) => fetch_by_fiat_symbol(service, &store, args)
                    .await
                    .map(QueryData::Market),
                QueryKey::FindPriceHistoryByFiatSymbol(args) => {
                    fetch_price_history_by_fiat_symbol(service, &store, args)
                        .await
                        .map(QueryData::PriceHistory)
                }
            }
        }
        .boxed()
    }
}

/// 특정 세대에 묶인 스토어 핸들.
struct EpochDispatcher {
    store: MarketStore,
    epoch: u64,
}

impl EpochDispatcher {
    fn dispatch(&self, action: MarketDataAction) {
        self.store.dispatch_in_epoch(self.epoch, action);
    }
}

#[instrument(skip_all, fields(provider = service.name(), count))]
async fn fetch_all(
    service: &dyn MarketService,
    store: &EpochDispatcher,
    count: usize,
) -> QueryResult<MarketDataById<AssetId>> {
    match service.find_all(count).await {
        Ok(data) => {
            store.dispatch(MarketDataAction::SetCryptoMarketData(data.clone()));
            Ok(data)
        }
        Err(e) => {
            warn!(error = %e, "findAll failed");
            Err(endpoint_error(&QueryKey::FindAll))
        }
    }
}

#[instrument(skip_all, fields(provider = service.name(), asset_id = %asset_id))]
async fn fetch_by_asset_id(
    service: &dyn MarketService,
    store: &EpochDispatcher,
    asset_id: AssetId,
) -> QueryResult<MarketData> {
    match service.find_by_asset_id(&asset_id).await {
        Ok(Some(data)) => {
            let payload: MarketDataById<AssetId> =
                [(asset_id, data.clone())].into_iter().collect();
            store.dispatch(MarketDataAction::SetCryptoMarketData(payload));
            Ok(data)
        }
        Ok(None) => {
            warn!("findByAssetId returned no data");
            Err(endpoint_error(&QueryKey::FindByAssetId(asset_id)))
        }
        Err(e) => {
            warn!(error = %e, "findByAssetId failed");
            Err(endpoint_error(&QueryKey::FindByAssetId(asset_id)))
        }
    }
}

#[instrument(
    skip_all,
    fields(provider = service.name(), asset_id = %args.asset_id, timeframe = %args.timeframe)
)]
async fn fetch_price_history_by_asset_id(
    service: &dyn MarketService,
    store: &EpochDispatcher,
    args: FindPriceHistoryByAssetIdArgs,
) -> QueryResult<Vec<HistoryData>> {
    match service
        .find_price_history_by_asset_id(&args.asset_id, args.timeframe)
        .await
    {
        Ok(data) => {
            store.dispatch(MarketDataAction::SetCryptoPriceHistory(PriceHistoryPayload {
                data: data.clone(),
                args,
            }));
            Ok(data)
        }
        Err(e) => {
            warn!(error = %e, "findPriceHistoryByAssetId failed");
            Err(endpoint_error(&QueryKey::FindPriceHistoryByAssetId(args)))
        }
    }
}

#[instrument(skip_all, fields(provider = service.name(), symbol = %args.symbol))]
async fn fetch_by_fiat_symbol(
    service: &dyn MarketService,
    store: &EpochDispatcher,
    args: FindByFiatSymbolArgs,
) -> QueryResult<MarketData> {
    match service.find_by_fiat_symbol(args.symbol).await {
        Ok(Some(data)) => {
            let payload: MarketDataById<FiatCurrency> =
                [(args.symbol, data.clone())].into_iter().collect();
            store.dispatch(MarketDataAction::SetFiatMarketData(payload));
            Ok(data)
        }
        Ok(None) => {
            warn!("findByFiatSymbol returned no data");
            Err(endpoint_error(&QueryKey::FindByFiatSymbol(args)))
        }
        Err(e) => {
            warn!(error = %e, "findByFiatSymbol failed");
            Err(endpoint_error(&QueryKey::FindByFiatSymbol(args)))
        }
    }
}

#[instrument(
    skip_all,
    fields(provider = service.name(), symbol = %args.symbol, timeframe = %args.timeframe)
)]
async fn fetch_price_history_by_fiat_symbol(
    service: &dyn MarketService,
    store: &EpochDispatcher,
    args: FindPriceHistoryByFiatSymbolArgs,
) -> QueryResult<Vec<HistoryData>> {
    match service
        .find_price_history_by_fiat_symbol(args.symbol, args.timeframe)
        .await
    {
        Ok(data) => {
            store.dispatch(MarketDataAction::SetFiatPriceHistory(PriceHistoryPayload {
                data: data.clone(),
                args,
            }));
            Ok(data)
        }
        Err(e) => {
            warn!(error = %e, "findPriceHistoryByFiatSymbol failed");
            Err(endpoint_error(&QueryKey::FindPriceHistoryByFiatSymbol(args)))
        }
    }
}
