//! 가격 이력 타임프레임 정의.
//!
//! 가격 이력 캐시는 아래 고정된 타임프레임 단위로 분할됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

const HOUR_SECS: u64 = 60 * 60;
const DAY_SECS: u64 = 24 * HOUR_SECS;

/// 가격 이력 조회 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryTimeframe {
    /// 최근 1시간
    Hour,
    /// 최근 24시간
    Day,
    /// 최근 7일
    Week,
    /// 최근 30일
    Month,
    /// 최근 1년
    Year,
    /// 전체 기간
    All,
}

impl HistoryTimeframe {
    /// 모든 타임프레임을 정의 순서대로 반환합니다.
    pub fn all() -> [HistoryTimeframe; 6] {
        [
            HistoryTimeframe::Hour,
            HistoryTimeframe::Day,
            HistoryTimeframe::Week,
            HistoryTimeframe::Month,
            HistoryTimeframe::Year,
            HistoryTimeframe::All,
        ]
    }

    /// 조회 범위의 길이를 반환합니다. `All`은 상한이 없으므로 `None`.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            HistoryTimeframe::Hour => Some(Duration::from_secs(HOUR_SECS)),
            HistoryTimeframe::Day => Some(Duration::from_secs(DAY_SECS)),
            HistoryTimeframe::Week => Some(Duration::from_secs(7 * DAY_SECS)),
            HistoryTimeframe::Month => Some(Duration::from_secs(30 * DAY_SECS)), // 근사값
            HistoryTimeframe::Year => Some(Duration::from_secs(365 * DAY_SECS)),
            HistoryTimeframe::All => None,
        }
    }

    /// 대문자 식별 문자열 (직렬화 형식과 동일).
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryTimeframe::Hour => "HOUR",
            HistoryTimeframe::Day => "DAY",
            HistoryTimeframe::Week => "WEEK",
            HistoryTimeframe::Month => "MONTH",
            HistoryTimeframe::Year => "YEAR",
            HistoryTimeframe::All => "ALL",
        }
    }
}

impl fmt::Display for HistoryTimeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HistoryTimeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HOUR" | "1H" => Ok(HistoryTimeframe::Hour),
            "DAY" | "1D" | "24H" => Ok(HistoryTimeframe::Day),
            "WEEK" | "1W" | "7D" => Ok(HistoryTimeframe::Week),
            "MONTH" | "1M" | "30D" => Ok(HistoryTimeframe::Month),
            "YEAR" | "1Y" => Ok(HistoryTimeframe::Year),
            "ALL" | "MAX" => Ok(HistoryTimeframe::All),
            _ => Err(CoreError::InvalidTimeframe(s.to_string())),
        }
    }
}
