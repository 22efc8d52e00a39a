//! 시장 데이터 캐시 전반에서 사용되는 공통 타입.

mod asset_id;
mod fiat;
mod market;
mod timeframe;

pub use asset_id::*;
pub use fiat::*;
pub use market::*;
pub use timeframe::*;
