//! CoinGecko 응답 형식과 변환.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use market_core::{HistoryData, HistoryTimeframe, MarketData};

/// `/coins/markets` 한 페이지의 최대 항목 수.
pub const MAX_PER_PAGE: usize = 250;

/// `/coins/markets` 항목.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

impl CoinMarket {
    pub fn to_market_data(&self) -> MarketData {
        MarketData {
            price: decimal_or_zero(self.current_price),
            market_cap: decimal_or_zero(self.market_cap),
            volume: decimal_or_zero(self.total_volume),
            change_percent_24hr: self.price_change_percentage_24h.unwrap_or_default(),
            supply: self.circulating_supply.and_then(to_decimal),
            max_supply: self.max_supply.and_then(to_decimal),
        }
    }
}

/// `/coins/list?include_platform=true` 항목.
///
/// `platforms`는 플랫폼 이름 → 컨트랙트 주소이며, 네이티브 코인은 빈 문자열이나 `null`을 가집니다.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinListEntry {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platforms: HashMap<String, Option<String>>,
}

/// `/coins/{id}`, `/coins/{platform}/contract/{address}` 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub market_data: Option<CoinDetailMarketData>,
}

/// 통화별 값이 담긴 시세 블록.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinDetailMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub max_supply: Option<f64>,
}

impl CoinDetail {
    /// `vs_currency` 기준 시세. 가격이 없으면 `None`.
    pub fn to_market_data(&self, vs_currency: &str) -> Option<MarketData> {
        let data = self.market_data.as_ref()?;
        let price = data.current_price.get(vs_currency).copied().and_then(to_decimal)?;

        Some(MarketData {
            price,
            market_cap: decimal_or_zero(data.market_cap.get(vs_currency).copied()),
            volume: decimal_or_zero(data.total_volume.get(vs_currency).copied()),
            change_percent_24hr: data.price_change_percentage_24h.unwrap_or_default(),
            supply: data.circulating_supply.and_then(to_decimal),
            max_supply: data.max_supply.and_then(to_decimal),
        })
    }
}

/// `/coins/{id}/market_chart` 응답. `prices`는 `[밀리초, 가격]` 쌍.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<(f64, f64)>,
}

impl MarketChart {
    /// `since_ms` 이후의 가격만 이력으로 변환합니다.
    pub fn to_history(&self, since_ms: Option<i64>) -> Vec<HistoryData> {
        self.prices
            .iter()
            .filter_map(|(date, price)| {
                let date = *date as i64;
                if since_ms.is_some_and(|since| date < since) {
                    return None;
                }
                Some(HistoryData::new(to_decimal(*price)?, date))
            })
            .collect()
    }
}

/// 타임프레임 → `market_chart`의 `days` 파라미터.
pub fn chart_days(timeframe: HistoryTimeframe) -> &'static str {
    match timeframe {
        HistoryTimeframe::Hour | HistoryTimeframe::Day => "1",
        HistoryTimeframe::Week => "7",
        HistoryTimeframe::Month => "30",
        HistoryTimeframe::Year => "365",
        HistoryTimeframe::All => "max",
    }
}

pub(crate) fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

fn decimal_or_zero(value: Option<f64>) -> Decimal {
    value.and_then(to_decimal).unwrap_or_default()
}
