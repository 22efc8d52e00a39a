//! 시장 데이터 캐시와 조회 오케스트레이션.
//!
//! 이 crate는 다음을 제공합니다:
//! - 암호화폐/법정화폐 시세와 가격 이력을 담는 정규화된 상태 (`state`)
//! - 상태를 공유하는 주입 가능한 스토어 (`store`)와 셀렉터 (`selectors`)
//! - 요청 중복 제거, 구독, 재연결 시 재요청을 지원하는 조회 캐시 (`query`)
//! - 다섯 개의 조회 엔드포인트 (`api`)
//! - HTTP 시세 제공자 (`provider`)

pub mod api;
pub mod collections;
pub mod error;
pub mod provider;
pub mod query;
pub mod selectors;
pub mod service;
pub mod state;
pub mod store;

pub use api::{endpoint_error, MarketApi};
pub use collections::{union_ids, OrderedMap};
pub use error::{QueryError, QueryResult, ServiceError, ServiceResult};
pub use service::MarketService;
pub use state::{
    reduce, FindByFiatSymbolArgs, FindPriceHistoryByAssetIdArgs,
    FindPriceHistoryByFiatSymbolArgs, MarketDataAction, MarketDataById, MarketDataSlice,
    MarketDataState, PriceHistory, PriceHistoryPayload,
};
pub use store::MarketStore;

// 조회 캐시 재내보내기
pub use query::{
    ConnectivityObserver, ConnectivityStatus, ManualConnectivity, QueryCache, QueryData,
    QueryExecutor, QueryKey, QueryState, QueryStatus, QuerySubscription,
};

// 제공자 재내보내기
pub use provider::{AssetIdAdapter, HttpMarketService};
