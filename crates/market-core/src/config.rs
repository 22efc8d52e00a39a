//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 시세 제공자 설정
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 조회 캐시 설정
    #[serde(default)]
    pub query: QueryConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 시세 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// 암호화폐 시세 API 기본 URL (CoinGecko 호환)
    #[serde(default = "default_crypto_base_url")]
    pub crypto_base_url: String,
    /// 환율 API 기본 URL (exchangerate.host 호환)
    #[serde(default = "default_fiat_base_url")]
    pub fiat_base_url: String,
    /// 시세 표시 통화
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_crypto_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_fiat_base_url() -> String {
    "https://api.exchangerate.host".to_string()
}
fn default_vs_currency() -> String {
    "usd".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            crypto_base_url: default_crypto_base_url(),
            fiat_base_url: default_fiat_base_url(),
            vs_currency: default_vs_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// 조회 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// 전체 조회 시 가져올 시가총액 상위 자산 수
    #[serde(default = "default_find_all_count")]
    pub find_all_count: usize,
    /// 네트워크 재연결 시 구독 중인 조회 재실행 여부
    #[serde(default = "default_refetch_on_reconnect")]
    pub refetch_on_reconnect: bool,
}

fn default_find_all_count() -> usize {
    1000
}
fn default_refetch_on_reconnect() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            find_all_count: default_find_all_count(),
            refetch_on_reconnect: default_refetch_on_reconnect(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `MARKET__QUERY__FIND_ALL_COUNT=500` 형식으로 오버라이드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("MARKET")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
