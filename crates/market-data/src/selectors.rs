//! 상태 조회 셀렉터.
//!
//! UI 계층이 캐시 구조를 직접 알지 않고 필요한 값만 읽도록 합니다.

use std::collections::HashMap;

use market_core::{AssetId, FiatCurrency, HistoryData, HistoryTimeframe, MarketData};

use crate::state::MarketDataState;

/// 알려진 암호화폐 식별자 목록 (삽입 순서).
pub fn select_market_data_ids(state: &MarketDataState) -> &[AssetId] {
    &state.crypto.ids
}

/// 암호화폐 시세 전체.
pub fn select_market_data(state: &MarketDataState) -> &HashMap<AssetId, MarketData> {
    &state.crypto.by_id
}

/// 자산 하나의 시세.
pub fn select_market_data_by_id<'a>(
    state: &'a MarketDataState,
    asset_id: &AssetId,
) -> Option<&'a MarketData> {
    state.crypto.by_id.get(asset_id)
}

/// 시세가 적재된 자산인지 확인.
pub fn select_is_market_data_loaded(state: &MarketDataState, asset_id: &AssetId) -> bool {
    state.crypto.by_id.contains_key(asset_id)
}

/// 타임프레임 하나의 암호화폐 가격 이력 전체.
pub fn select_price_history_timeframe(
    state: &MarketDataState,
    timeframe: HistoryTimeframe,
) -> Option<&HashMap<AssetId, Vec<HistoryData>>> {
    state.crypto.price_history.timeframe(timeframe)
}

/// (자산, 타임프레임)의 가격 이력. 없으면 빈 슬라이스.
pub fn select_price_history_by_asset_timeframe<'a>(
    state: &'a MarketDataState,
    asset_id: &AssetId,
    timeframe: HistoryTimeframe,
) -> &'a [HistoryData] {
    state
        .crypto
        .price_history
        .get(timeframe, asset_id)
        .unwrap_or_default()
}

/// 여러 자산의 가격 이력을 한 번에 조회합니다. 이력이 없는 자산은 제외.
pub fn select_price_history_by_asset_ids<'a>(
    state: &'a MarketDataState,
    asset_ids: &[AssetId],
    timeframe: HistoryTimeframe,
) -> Vec<(&'a AssetId, &'a [HistoryData])> {
    let Some(by_id) = state.crypto.price_history.timeframe(timeframe) else {
        return Vec::new();
    };

    asset_ids
        .iter()
        .filter_map(|id| by_id.get_key_value(id))
        .map(|(id, data)| (id, data.as_slice()))
        .collect()
}

/// 법정화폐 하나의 시세.
pub fn select_fiat_market_data(
    state: &MarketDataState,
    symbol: FiatCurrency,
) -> Option<&MarketData> {
    state.fiat.by_id.get(&symbol)
}

/// (법정화폐, 타임프레임)의 가격 이력. 없으면 빈 슬라이스.
pub fn select_fiat_price_history_by_timeframe(
    state: &MarketDataState,
    symbol: FiatCurrency,
    timeframe: HistoryTimeframe,
) -> &[HistoryData] {
    state
        .fiat
        .price_history
        .get(timeframe, &symbol)
        .unwrap_or_default()
}
