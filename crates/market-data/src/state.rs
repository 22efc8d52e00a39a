//! 시장 데이터 캐시 상태 및 리듀서.
//!
//! 상태는 명시적으로 소유되는 값이며, 모든 변경은 아래 순수 변경 함수를
//! 통해서만 이루어집니다. 변경은 동기적이고 실패하지 않습니다.
//!
//! ```text
//! MarketDataState
//! ├── crypto: MarketDataSlice<AssetId>
//! │   ├── by_id          AssetId → MarketData
//! │   ├── ids            삽입 순서 식별자 목록 (= by_id 키 집합)
//! │   └── price_history  HistoryTimeframe → AssetId → [HistoryData]
//! └── fiat: MarketDataSlice<FiatCurrency>
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use market_core::{AssetId, FiatCurrency, HistoryData, HistoryTimeframe, MarketData};

use crate::collections::{union_ids, OrderedMap};

/// 식별자 → 시세 레코드 페이로드 (삽입 순서 보존).
pub type MarketDataById<K> = OrderedMap<K, MarketData>;

/// 타임프레임별 가격 이력.
///
/// 모든 타임프레임 키가 초기화 시점부터 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize + Eq + Hash",
    deserialize = "K: Deserialize<'de> + Eq + Hash"
))]
pub struct PriceHistory<K: Eq + Hash>(HashMap<HistoryTimeframe, HashMap<K, Vec<HistoryData>>>);

impl<K: Eq + Hash> Default for PriceHistory<K> {
    fn default() -> Self {
        Self(
            HistoryTimeframe::all()
                .into_iter()
                .map(|timeframe| (timeframe, HashMap::new()))
                .collect(),
        )
    }
}

impl<K: Eq + Hash> PriceHistory<K> {
    /// 특정 타임프레임의 전체 이력 맵.
    pub fn timeframe(&self, timeframe: HistoryTimeframe) -> Option<&HashMap<K, Vec<HistoryData>>> {
        self.0.get(&timeframe)
    }

    /// 특정 (타임프레임, 식별자)의 이력.
    pub fn get(&self, timeframe: HistoryTimeframe, id: &K) -> Option<&[HistoryData]> {
        self.0
            .get(&timeframe)
            .and_then(|by_id| by_id.get(id))
            .map(Vec::as_slice)
    }

    /// (타임프레임, 식별자)의 이력을 교체합니다 (병합하지 않음).
    fn replace(&mut self, timeframe: HistoryTimeframe, id: K, data: Vec<HistoryData>) {
        self.0.entry(timeframe).or_default().insert(id, data);
    }
}

/// 암호화폐/법정화폐가 공유하는 하위 상태.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "K: Serialize + Eq + Hash",
    deserialize = "K: Deserialize<'de> + Eq + Hash"
))]
pub struct MarketDataSlice<K: Eq + Hash> {
    pub by_id: HashMap<K, MarketData>,
    pub ids: Vec<K>,
    pub price_history: PriceHistory<K>,
}

impl<K: Eq + Hash> Default for MarketDataSlice<K> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            ids: Vec::new(),
            price_history: PriceHistory::default(),
        }
    }
}

impl<K: Eq + Hash + Clone> MarketDataSlice<K> {
    /// 페이로드를 `by_id`에 병합하고 `ids`를 합집합으로 재계산합니다.
    /// 키가 겹치면 페이로드 값이 우선합니다.
    pub fn upsert_market_data(&mut self, payload: MarketDataById<K>) {
        self.ids = union_ids(&self.ids, payload.keys());
        self.by_id.extend(payload);
    }

    /// (타임프레임, 식별자)의 가격 이력을 교체합니다.
    pub fn upsert_price_history(&mut self, timeframe: HistoryTimeframe, id: K, data: Vec<HistoryData>) {
        self.price_history.replace(timeframe, id, data);
    }
}

/// 암호화폐 가격 이력 조회 인자.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPriceHistoryByAssetIdArgs {
    pub asset_id: AssetId,
    pub timeframe: HistoryTimeframe,
}

/// 법정화폐 시세 조회 인자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindByFiatSymbolArgs {
    pub symbol: FiatCurrency,
}

/// 법정화폐 가격 이력 조회 인자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindPriceHistoryByFiatSymbolArgs {
    pub symbol: FiatCurrency,
    pub timeframe: HistoryTimeframe,
}

/// 가격 이력 변경 페이로드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPayload<A> {
    pub data: Vec<HistoryData>,
    pub args: A,
}

/// 시장 데이터 루트 캐시.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDataState {
    pub crypto: MarketDataSlice<AssetId>,
    pub fiat: MarketDataSlice<FiatCurrency>,
}

impl MarketDataState {
    /// 초기 상태 (모든 타임프레임에 빈 맵).
    pub fn new() -> Self {
        Self::default()
    }

    /// 상태 전체를 초기 상태로 되돌립니다.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_crypto_market_data(&mut self, payload: MarketDataById<AssetId>) {
        self.crypto.upsert_market_data(payload);
    }

    pub fn set_crypto_price_history(
        &mut self,
        payload: PriceHistoryPayload<FindPriceHistoryByAssetIdArgs>,
    ) {
        let PriceHistoryPayload { data, args } = payload;
        self.crypto
            .upsert_price_history(args.timeframe, args.asset_id, data);
    }

    pub fn set_fiat_market_data(&mut self, payload: MarketDataById<FiatCurrency>) {
        self.fiat.upsert_market_data(payload);
    }

    pub fn set_fiat_price_history(
        &mut self,
        payload: PriceHistoryPayload<FindPriceHistoryByFiatSymbolArgs>,
    ) {
        let PriceHistoryPayload { data, args } = payload;
        self.fiat.upsert_price_history(args.timeframe, args.symbol, data);
    }
}

/// 상태 변경 액션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum MarketDataAction {
    Clear,
    SetCryptoMarketData(MarketDataById<AssetId>),
    SetCryptoPriceHistory(PriceHistoryPayload<FindPriceHistoryByAssetIdArgs>),
    SetFiatMarketData(MarketDataById<FiatCurrency>),
    SetFiatPriceHistory(PriceHistoryPayload<FindPriceHistoryByFiatSymbolArgs>),
}

impl MarketDataAction {
    /// 액션 이름 (로그용).
    pub fn name(&self) -> &'static str {
        match self {
            MarketDataAction::Clear => "clear",
            MarketDataAction::SetCryptoMarketData(_) => "setCryptoMarketData",
            MarketDataAction::SetCryptoPriceHistory(_) => "setCryptoPriceHistory",
            MarketDataAction::SetFiatMarketData(_) => "setFiatMarketData",
            MarketDataAction::SetFiatPriceHistory(_) => "setFiatPriceHistory",
        }
    }
}

/// 액션을 상태에 적용합니다.
pub fn reduce(state: &mut MarketDataState, action: MarketDataAction) {
    match action {
        MarketDataAction::Clear => state.clear(),
        MarketDataAction::SetCryptoMarketData(payload) => state.set_crypto_market_data(payload),
        MarketDataAction::SetCryptoPriceHistory(payload) => state.set_crypto_price_history(payload),
        MarketDataAction::SetFiatMarketData(payload) => state.set_fiat_market_data(payload),
        MarketDataAction::SetFiatPriceHistory(payload) => state.set_fiat_price_history(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn asset(s: &str) -> AssetId {
        s.parse().unwrap()
    }

    fn record(price: rust_decimal::Decimal) -> MarketData {
        MarketData::from_price(price)
    }

    fn eth() -> AssetId {
        asset("eip155:1/slip44:60")
    }

    fn btc() -> AssetId {
        asset("bip122:000000000019d6689c085ae165831e93/slip44:0")
    }

    fn atom() -> AssetId {
        asset("cosmos:cosmoshub-4/slip44:118")
    }

    fn assert_ids_match_keys<K: Eq + Hash + Clone + std::fmt::Debug>(slice: &MarketDataSlice<K>) {
        let ids: HashSet<_> = slice.ids.iter().collect();
        let keys: HashSet<_> = slice.by_id.keys().collect();
        assert_eq!(ids, keys);
        assert_eq!(ids.len(), slice.ids.len());
    }

    #[test]
    fn test_initial_state_has_every_timeframe() {
        let state = MarketDataState::new();
        for timeframe in HistoryTimeframe::all() {
            assert!(state.crypto.price_history.timeframe(timeframe).unwrap().is_empty());
            assert!(state.fiat.price_history.timeframe(timeframe).unwrap().is_empty());
        }
        assert!(state.crypto.ids.is_empty());
        assert!(state.fiat.by_id.is_empty());
    }

    #[test]
    fn test_set_crypto_market_data_merges_and_unions() {
        let mut state = MarketDataState::new();
        state.set_crypto_market_data(
            [(eth(), record(dec!(3000))), (btc(), record(dec!(60000)))]
                .into_iter()
                .collect(),
        );

        state.set_crypto_market_data(
            [(atom(), record(dec!(10))), (eth(), record(dec!(3100)))]
                .into_iter()
                .collect(),
        );

        assert_eq!(state.crypto.ids, vec![eth(), btc(), atom()]);
        assert_eq!(state.crypto.by_id[&eth()].price, dec!(3100));
        assert_eq!(state.crypto.by_id[&btc()].price, dec!(60000));
        assert_eq!(state.crypto.by_id[&atom()].price, dec!(10));
        assert_ids_match_keys(&state.crypto);
    }

    #[test]
    fn test_empty_payload_is_noop() {
        let mut state = MarketDataState::new();
        state.set_crypto_market_data([(eth(), record(dec!(1)))].into_iter().collect());
        let before = state.clone();

        state.set_crypto_market_data(OrderedMap::new());
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear_returns_initial_state() {
        let mut state = MarketDataState::new();
        state.set_crypto_market_data([(eth(), record(dec!(1)))].into_iter().collect());
        state.set_fiat_market_data([(FiatCurrency::EUR, record(dec!(0.9)))].into_iter().collect());
        state.set_crypto_price_history(PriceHistoryPayload {
            data: vec![HistoryData::new(dec!(1), 1)],
            args: FindPriceHistoryByAssetIdArgs {
                asset_id: eth(),
                timeframe: HistoryTimeframe::Week,
            },
        });

        reduce(&mut state, MarketDataAction::Clear);
        assert_eq!(state, MarketDataState::default());
    }

    #[test]
    fn test_set_crypto_price_history_replaces_single_cell() {
        let mut state = MarketDataState::new();
        let week = vec![HistoryData::new(dec!(5), 10)];
        state.set_crypto_price_history(PriceHistoryPayload {
            data: week.clone(),
            args: FindPriceHistoryByAssetIdArgs {
                asset_id: asset("eip155:1/slip44:60"),
                timeframe: HistoryTimeframe::Week,
            },
        });

        let first = vec![HistoryData::new(dec!(1), 1), HistoryData::new(dec!(2), 2)];
        let second = vec![HistoryData::new(dec!(3), 3)];
        for data in [first, second.clone()] {
            reduce(
                &mut state,
                MarketDataAction::SetCryptoPriceHistory(PriceHistoryPayload {
                    data,
                    args: FindPriceHistoryByAssetIdArgs {
                        asset_id: eth(),
                        timeframe: HistoryTimeframe::Day,
                    },
                }),
            );
        }

        // 병합이 아닌 교체
        assert_eq!(
            state.crypto.price_history.get(HistoryTimeframe::Day, &eth()),
            Some(second.as_slice())
        );
        // 다른 타임프레임은 그대로
        assert_eq!(
            state.crypto.price_history.get(HistoryTimeframe::Week, &eth()),
            Some(week.as_slice())
        );
        assert!(state.crypto.price_history.get(HistoryTimeframe::Day, &btc()).is_none());
        // 가격 이력은 시세 목록에 영향을 주지 않음
        assert!(state.crypto.ids.is_empty());
    }

    #[test]
    fn test_fiat_actions() {
        let mut state = MarketDataState::new();
        reduce(
            &mut state,
            MarketDataAction::SetFiatMarketData(
                [(FiatCurrency::EUR, record(dec!(0.92))), (FiatCurrency::KRW, record(dec!(1350)))]
                    .into_iter()
                    .collect(),
            ),
        );
        reduce(
            &mut state,
            MarketDataAction::SetFiatMarketData(
                [(FiatCurrency::KRW, record(dec!(1360)))].into_iter().collect(),
            ),
        );
        reduce(
            &mut state,
            MarketDataAction::SetFiatPriceHistory(PriceHistoryPayload {
                data: vec![HistoryData::new(dec!(0.9), 100)],
                args: FindPriceHistoryByFiatSymbolArgs {
                    symbol: FiatCurrency::EUR,
                    timeframe: HistoryTimeframe::Month,
                },
            }),
        );

        assert_eq!(state.fiat.ids, vec![FiatCurrency::EUR, FiatCurrency::KRW]);
        assert_eq!(state.fiat.by_id[&FiatCurrency::KRW].price, dec!(1360));
        assert_eq!(
            state
                .fiat
                .price_history
                .get(HistoryTimeframe::Month, &FiatCurrency::EUR)
                .map(|d| d.len()),
            Some(1)
        );
        assert!(state.crypto.ids.is_empty());
        assert_ids_match_keys(&state.fiat);
    }

    #[test]
    fn test_action_serde_shape() {
        let action = MarketDataAction::SetFiatMarketData(
            [(FiatCurrency::EUR, record(dec!(1)))].into_iter().collect(),
        );
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "setFiatMarketData");
        assert!(json["payload"]["EUR"].is_object());
        assert_eq!(action.name(), "setFiatMarketData");
    }
}
