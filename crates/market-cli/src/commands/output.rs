//! 조회 결과 출력.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use market_core::{HistoryData, MarketData};

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: table, json", s)),
        }
    }
}

/// 시세 한 행.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRow {
    pub id: String,
    #[serde(flatten)]
    pub data: MarketData,
}

/// 시세 목록 출력 문자열.
pub fn render_market(rows: &[MarketRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => Ok(market_table(rows)),
    }
}

/// 가격 이력 출력 문자열.
pub fn render_history(id: &str, history: &[HistoryData], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(history)?),
        OutputFormat::Table => Ok(history_table(id, history)),
    }
}

fn market_table(rows: &[MarketRow]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<56} {:>18} {:>22} {:>20} {:>9}\n",
        "ID", "PRICE", "MARKET_CAP", "VOLUME", "24H %"
    ));
    output.push_str(&"-".repeat(129));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:<56} {:>18} {:>22} {:>20} {:>9.2}\n",
            truncate(&row.id, 56),
            row.data.price.normalize().to_string(),
            row.data.market_cap.round_dp(0).to_string(),
            row.data.volume.round_dp(0).to_string(),
            row.data.change_percent_24hr
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} assets", rows.len()));
    output
}

fn history_table(id: &str, history: &[HistoryData]) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n\n", id));
    output.push_str(&format!("{:<26} {:>18}\n", "DATE", "PRICE"));
    output.push_str(&"-".repeat(45));
    output.push('\n');

    for point in history {
        let date = point
            .datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| point.date.to_string());
        output.push_str(&format!("{:<26} {:>18}\n", date, point.price.normalize().to_string()));
    }

    if let Some(summary) = summarize(history) {
        output.push('\n');
        output.push_str(&format!(
            "Points: {}  Low: {}  High: {}  Change: {}%",
            history.len(),
            summary.low.normalize(),
            summary.high.normalize(),
            summary.change_percent.round_dp(2)
        ));
    }
    output
}

struct Summary {
    low: Decimal,
    high: Decimal,
    change_percent: Decimal,
}

fn summarize(history: &[HistoryData]) -> Option<Summary> {
    let first = history.first()?.price;
    let last = history.last()?.price;
    let low = history.iter().map(|h| h.price).min()?;
    let high = history.iter().map(|h| h.price).max()?;
    let change_percent = if first.is_zero() {
        Decimal::ZERO
    } else {
        (last - first) / first * Decimal::ONE_HUNDRED
    };

    Some(Summary {
        low,
        high,
        change_percent,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
