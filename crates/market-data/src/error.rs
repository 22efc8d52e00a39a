//! 데이터 모듈 오류 타입.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 시세 제공자 호출 오류.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// 네트워크/연결 오류
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 오류 응답
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 제공자가 해당 식별자를 알지 못함
    #[error("Not found: {0}")]
    NotFound(String),

    /// 제공자가 지원하지 않는 요청
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl ServiceError {
    /// 재시도 가능한 오류인지 확인.
    ///
    /// 이 계층은 재시도하지 않지만 호출자가 판단할 수 있도록 분류만 제공합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network(_) => true,
            ServiceError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Parse(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Parse(err.to_string())
    }
}

/// 제공자 호출 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// 조회 엔드포인트가 반환하는 고정 형태의 오류 값.
///
/// `data`는 엔드포인트와 요청 키를 포함한 정적 메시지이며,
/// 원인 오류는 보존하지 않습니다 (로그로만 남김).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{data} (status {status})")]
pub struct QueryError {
    pub data: String,
    pub status: u16,
}

impl QueryError {
    pub const NOT_FOUND: u16 = 404;
    pub const BAD_REQUEST: u16 = 400;

    pub fn not_found(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            status: Self::NOT_FOUND,
        }
    }

    pub fn bad_request(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            status: Self::BAD_REQUEST,
        }
    }
}

/// 조회 엔드포인트 Result 타입.
pub type QueryResult<T> = Result<T, QueryError>;
