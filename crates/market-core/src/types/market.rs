//! 시세 레코드 및 가격 이력 데이터 포인트.
//!
//! 캐시 계층은 이 값들을 해석하지 않고 그대로 보관합니다.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 가격 타입 별칭.
pub type Price = Decimal;

/// 식별자 하나에 대한 현재 시세 스냅샷.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    /// 현재가 (기준 통화 단위)
    pub price: Price,
    /// 시가총액
    pub market_cap: Decimal,
    /// 24시간 거래량
    pub volume: Decimal,
    /// 24시간 변동률 (%)
    pub change_percent_24hr: f64,
    /// 유통 공급량
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<Decimal>,
    /// 최대 공급량
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<Decimal>,
}

impl MarketData {
    /// 가격만 알려진 레코드를 생성합니다 (법정화폐 환율 등).
    pub fn from_price(price: Price) -> Self {
        Self {
            price,
            ..Default::default()
        }
    }
}

/// 가격 이력 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    /// 가격
    pub price: Price,
    /// 시각 (Unix epoch 밀리초)
    pub date: i64,
}

impl HistoryData {
    pub fn new(price: Price, date: i64) -> Self {
        Self { price, date }
    }

    /// `date`를 UTC 시각으로 변환합니다.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.date).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_data_camel_case() {
        let data = MarketData {
            price: dec!(3000),
            market_cap: dec!(360000000000),
            volume: dec!(12000000000),
            change_percent_24hr: 1.5,
            supply: None,
            max_supply: None,
        };

        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("marketCap").is_some());
        assert!(json.get("changePercent24hr").is_some());
        assert!(json.get("supply").is_none());
    }

    #[test]
    fn test_history_datetime() {
        let point = HistoryData::new(dec!(1), 1_700_000_000_000);
        let dt = point.datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
