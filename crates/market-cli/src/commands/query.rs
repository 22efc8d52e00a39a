//! 조회 명령 실행.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use market_core::{AppConfig, AssetId, FiatCurrency, HistoryTimeframe};
use market_data::{
    FindByFiatSymbolArgs, FindPriceHistoryByAssetIdArgs, FindPriceHistoryByFiatSymbolArgs,
    HttpMarketService, MarketApi, MarketStore,
};

use super::output::{render_history, render_market, MarketRow, OutputFormat};

/// 설정으로부터 조회 API를 구성합니다.
pub fn build_api(config: &AppConfig) -> Result<MarketApi> {
    let service = HttpMarketService::new(config.provider.clone())
        .context("Failed to create market data provider")?;

    Ok(MarketApi::with_config(
        Arc::new(service),
        MarketStore::default(),
        config.query.clone(),
    ))
}

/// 시가총액 상위 자산 시세.
pub async fn all(api: &MarketApi, limit: usize, format: OutputFormat) -> Result<String> {
    let data = api.find_all().await.context("findAll failed")?;
    info!("Loaded {} assets", data.len());

    let rows: Vec<MarketRow> = data
        .into_iter()
        .take(limit)
        .map(|(id, data)| MarketRow {
            id: id.to_string(),
            data,
        })
        .collect();
    render_market(&rows, format)
}

/// 자산 하나의 시세.
pub async fn asset(api: &MarketApi, asset_id: &str, format: OutputFormat) -> Result<String> {
    let asset_id: AssetId = asset_id.parse()?;
    let data = api.find_by_asset_id(&asset_id).await?;

    render_market(
        &[MarketRow {
            id: asset_id.to_string(),
            data,
        }],
        format,
    )
}

/// 자산 하나의 가격 이력.
pub async fn history(
    api: &MarketApi,
    asset_id: &str,
    timeframe: &str,
    format: OutputFormat,
) -> Result<String> {
    let asset_id: AssetId = asset_id.parse()?;
    let timeframe: HistoryTimeframe = timeframe.parse()?;

    let history = api
        .find_price_history_by_asset_id(FindPriceHistoryByAssetIdArgs {
            asset_id: asset_id.clone(),
            timeframe,
        })
        .await?;
    render_history(&format!("{} ({})", asset_id, timeframe), &history, format)
}

/// 법정화폐 하나의 시세 (USD 기준 환율).
pub async fn fiat(api: &MarketApi, symbol: &str, format: OutputFormat) -> Result<String> {
    let symbol: FiatCurrency = symbol.parse()?;
    let data = api
        .find_by_fiat_symbol(FindByFiatSymbolArgs { symbol })
        .await?;

    render_market(
        &[MarketRow {
            id: symbol.to_string(),
            data,
        }],
        format,
    )
}

/// 법정화폐 하나의 가격 이력.
pub async fn fiat_history(
    api: &MarketApi,
    symbol: &str,
    timeframe: &str,
    format: OutputFormat,
) -> Result<String> {
    let symbol: FiatCurrency = symbol.parse()?;
    let timeframe: HistoryTimeframe = timeframe.parse()?;

    let history = api
        .find_price_history_by_fiat_symbol(FindPriceHistoryByFiatSymbolArgs { symbol, timeframe })
        .await?;
    render_history(&format!("{} ({})", symbol, timeframe), &history, format)
}
