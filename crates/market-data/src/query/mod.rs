//! 비동기 조회 캐시 인프라.
//!
//! - `key`: (엔드포인트, 인자) 조회 키
//! - `cache`: 요청 중복 제거, 상태 구독
//! - `connectivity`: 연결 상태 관찰과 재연결 시 재요청

pub mod cache;
pub mod connectivity;
pub mod key;

pub use cache::{QueryCache, QueryData, QueryState, QueryStatus, QuerySubscription, SharedQuery};
pub use connectivity::{
    refetch_subscribed, spawn_refetch_on_reconnect, ConnectivityObserver, ConnectivityStatus,
    ManualConnectivity, QueryExecutor,
};
pub use key::{Endpoint, QueryKey};
