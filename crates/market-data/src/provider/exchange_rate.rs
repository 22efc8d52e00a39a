//! 환율 API (exchangerate.host 호환) 응답 형식과 변환.
//!
//! 모든 환율은 USD 기준이며, 법정화폐의 "가격"은 1 USD에 대한 해당 통화의 환율입니다.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use market_core::{FiatCurrency, HistoryData, HistoryTimeframe, MarketData};

use super::coingecko::to_decimal;

/// 응답 날짜 형식.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `ALL` 타임프레임의 조회 기간 (일).
pub const ALL_TIME_DAYS: i64 = 3650;

/// `/latest` 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestRates {
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl LatestRates {
    pub fn to_market_data(&self, symbol: FiatCurrency) -> Option<MarketData> {
        let rate = self.rates.get(symbol.code()).copied().and_then(to_decimal)?;
        Some(MarketData::from_price(rate))
    }
}

/// `/timeseries` 응답. 날짜별 환율.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesRates {
    #[serde(default)]
    pub rates: BTreeMap<String, HashMap<String, f64>>,
}

impl TimeseriesRates {
    /// 날짜 오름차순 이력. 파싱할 수 없는 날짜는 건너뜁니다.
    pub fn to_history(&self, symbol: FiatCurrency) -> Vec<HistoryData> {
        self.rates
            .iter()
            .filter_map(|(date, rates)| {
                let date = parse_date_ms(date)?;
                let price = rates.get(symbol.code()).copied().and_then(to_decimal)?;
                Some(HistoryData::new(price, date))
            })
            .collect()
    }
}

/// 타임프레임의 (시작일, 종료일).
pub fn date_range(timeframe: HistoryTimeframe, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let span = timeframe
        .duration()
        .and_then(|d| Duration::from_std(d).ok())
        .unwrap_or_else(|| Duration::days(ALL_TIME_DAYS));
    ((now - span).date_naive(), now.date_naive())
}

/// 기준 통화(USD)의 이력. 요청 없이 범위 내 일별 1.0을 생성합니다.
pub fn base_history(start: NaiveDate, end: NaiveDate) -> Vec<HistoryData> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter_map(|day| {
            let ms = day.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
            Some(HistoryData::new(Decimal::ONE, ms))
        })
        .collect()
}

fn parse_date_ms(date: &str) -> Option<i64> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_latest_rates() {
        let latest: LatestRates =
            serde_json::from_str(r#"{"base":"USD","rates":{"EUR":0.5}}"#).unwrap();
        assert_eq!(
            latest.to_market_data(FiatCurrency::EUR).unwrap().price,
            dec!(0.5)
        );
        assert!(latest.to_market_data(FiatCurrency::JPY).is_none());
    }

    #[test]
    fn test_timeseries_sorted_by_date() {
        let json = r#"{"rates":{
            "2024-01-03":{"EUR":0.75},
            "2024-01-01":{"EUR":0.5},
            "bad-date":{"EUR":1.0},
            "2024-01-02":{"GBP":0.25}
        }}"#;
        let series: TimeseriesRates = serde_json::from_str(json).unwrap();
        let history = series.to_history(FiatCurrency::EUR);

        let jan1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp_millis();
        let jan3 = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap().timestamp_millis();
        assert_eq!(
            history,
            vec![HistoryData::new(dec!(0.5), jan1), HistoryData::new(dec!(0.75), jan3)]
        );
    }

    #[test]
    fn test_date_range() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let (start, end) = date_range(HistoryTimeframe::Week, now);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        let (start, _) = date_range(HistoryTimeframe::All, now);
        assert_eq!(start, (now - Duration::days(ALL_TIME_DAYS)).date_naive());
    }

    #[test]
    fn test_base_history() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let history = base_history(start, end);
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|h| h.price == Decimal::ONE));
    }
}
