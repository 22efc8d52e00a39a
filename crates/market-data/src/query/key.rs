//! 조회 캐시 키.

use serde::{Deserialize, Serialize};
use std::fmt;

use market_core::AssetId;

use crate::state::{
    FindByFiatSymbolArgs, FindPriceHistoryByAssetIdArgs, FindPriceHistoryByFiatSymbolArgs,
};

/// 조회 엔드포인트.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    FindAll,
    FindByAssetId,
    FindPriceHistoryByAssetId,
    FindByFiatSymbol,
    FindPriceHistoryByFiatSymbol,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::FindAll => "findAll",
            Endpoint::FindByAssetId => "findByAssetId",
            Endpoint::FindPriceHistoryByAssetId => "findPriceHistoryByAssetId",
            Endpoint::FindByFiatSymbol => "findByFiatSymbol",
            Endpoint::FindPriceHistoryByFiatSymbol => "findPriceHistoryByFiatSymbol",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// (엔드포인트, 인자) 조합으로 구성된 조회 키.
///
/// 같은 키의 동시 요청은 하나의 실제 요청으로 합쳐집니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "endpoint", content = "args", rename_all = "camelCase")]
pub enum QueryKey {
    FindAll,
    FindByAssetId(AssetId),
    FindPriceHistoryByAssetId(FindPriceHistoryByAssetIdArgs),
    FindByFiatSymbol(FindByFiatSymbolArgs),
    FindPriceHistoryByFiatSymbol(FindPriceHistoryByFiatSymbolArgs),
}

impl QueryKey {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            QueryKey::FindAll => Endpoint::FindAll,
            QueryKey::FindByAssetId(_) => Endpoint::FindByAssetId,
            QueryKey::FindPriceHistoryByAssetId(_) => Endpoint::FindPriceHistoryByAssetId,
            QueryKey::FindByFiatSymbol(_) => Endpoint::FindByFiatSymbol,
            QueryKey::FindPriceHistoryByFiatSymbol(_) => Endpoint::FindPriceHistoryByFiatSymbol,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::FindAll => write!(f, "findAll"),
            QueryKey::FindByAssetId(asset_id) => write!(f, "findByAssetId({})", asset_id),
            QueryKey::FindPriceHistoryByAssetId(args) => write!(
                f,
                "findPriceHistoryByAssetId({}, {})",
                args.asset_id, args.timeframe
            ),
            QueryKey::FindByFiatSymbol(args) => write!(f, "findByFiatSymbol({})", args.symbol),
            QueryKey::FindPriceHistoryByFiatSymbol(args) => write!(
                f,
                "findPriceHistoryByFiatSymbol({}, {})",
                args.symbol, args.timeframe
            ),
        }
    }
}
