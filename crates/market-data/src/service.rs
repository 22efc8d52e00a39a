//! 외부 시세 제공자 trait.

use async_trait::async_trait;

use market_core::{AssetId, FiatCurrency, HistoryData, HistoryTimeframe, MarketData};

use crate::error::ServiceResult;
use crate::state::MarketDataById;

/// 시세 제공자 인터페이스.
///
/// 단건 조회는 제공자가 값을 돌려주지 않을 수 있으므로 `Option`을 반환합니다.
#[async_trait]
pub trait MarketService: Send + Sync {
    /// 제공자 이름.
    fn name(&self) -> &str;

    /// 시가총액 상위 `count`개 자산의 시세.
    async fn find_all(&self, count: usize) -> ServiceResult<MarketDataById<AssetId>>;

    /// 자산 하나의 현재 시세.
    async fn find_by_asset_id(&self, asset_id: &AssetId) -> ServiceResult<Option<MarketData>>;

    /// 자산 하나의 가격 이력.
    async fn find_price_history_by_asset_id(
        &self,
        asset_id: &AssetId,
        timeframe: HistoryTimeframe,
    ) -> ServiceResult<Vec<HistoryData>>;

    /// 법정화폐 하나의 현재 시세 (USD 대비).
    async fn find_by_fiat_symbol(&self, symbol: FiatCurrency) -> ServiceResult<Option<MarketData>>;

    /// 법정화폐 하나의 가격 이력 (USD 대비).
    async fn find_price_history_by_fiat_symbol(
        &self,
        symbol: FiatCurrency,
        timeframe: HistoryTimeframe,
    ) -> ServiceResult<Vec<HistoryData>>;
}
