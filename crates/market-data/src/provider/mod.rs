//! 외부 시세 제공자 구현.
//!
//! - `http`: reqwest 기반 `MarketService` 구현
//! - `coingecko`, `exchange_rate`: 응답 형식과 도메인 타입 변환
//! - `adapter`: CoinGecko id ↔ 자산 식별자 매핑

pub mod adapter;
pub mod coingecko;
pub mod exchange_rate;
pub mod http;

pub use adapter::{AssetIdAdapter, CoinGeckoRef};
pub use http::HttpMarketService;
