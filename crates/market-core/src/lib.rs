//! # Market Core
//!
//! 시장 데이터 캐시의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 캐시/조회 계층 전반에서 사용되는 기본 타입을 제공합니다:
//! - 자산 식별자 (체인 네임스페이스 포함)
//! - 지원 법정화폐 목록
//! - 시세 레코드 및 가격 이력 데이터 포인트
//! - 가격 이력 타임프레임
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
