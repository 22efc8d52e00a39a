//! 도메인 타입 파싱/검증 에러.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// 자산 식별자 형식 오류
    #[error("잘못된 자산 식별자: {0}")]
    InvalidAssetId(String),

    /// 지원하지 않는 법정화폐
    #[error("지원하지 않는 법정화폐: {0}")]
    UnsupportedFiat(String),

    /// 알 수 없는 타임프레임
    #[error("잘못된 타임프레임: {0}")]
    InvalidTimeframe(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
